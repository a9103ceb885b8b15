use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::{
    AppointmentRepository, EmployeeRepository, EstablishmentRepository, OfferedServiceRepository,
    UserRepository, WebhookRepository,
};
use crate::domain::{
    Appointment, Employee, Establishment, OfferedService, Transaction, User, Webhook,
};
use crate::error::Result;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl OfferedServiceRepository for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<OfferedService>> {
        let service: Option<OfferedService> =
            sqlx::query_as("SELECT * FROM offered_services WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(service)
    }
}

#[async_trait]
impl EstablishmentRepository for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Establishment>> {
        let establishment: Option<Establishment> =
            sqlx::query_as("SELECT * FROM establishments WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(establishment)
    }

    async fn find_by_owner_id(&self, owner_id: Uuid) -> Result<Option<Establishment>> {
        let establishment: Option<Establishment> = sqlx::query_as(
            "SELECT * FROM establishments WHERE owner_id = $1 ORDER BY created_at LIMIT 1",
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(establishment)
    }
}

#[async_trait]
impl EmployeeRepository for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Employee>> {
        let employee: Option<Employee> = sqlx::query_as("SELECT * FROM employees WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }
}

#[async_trait]
impl AppointmentRepository for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>> {
        let appointment: Option<Appointment> =
            sqlx::query_as("SELECT * FROM appointments WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(appointment)
    }

    async fn find_by_client_in_range(
        &self,
        client_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        let appointments: Vec<Appointment> = sqlx::query_as(
            r#"
            SELECT * FROM appointments
            WHERE client_id = $1 AND start_time < $3 AND end_time > $2
            ORDER BY start_time
            "#,
        )
        .bind(client_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(appointments)
    }

    async fn find_by_establishment_in_range(
        &self,
        establishment_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        let appointments: Vec<Appointment> = sqlx::query_as(
            r#"
            SELECT * FROM appointments
            WHERE establishment_id = $1 AND start_time < $3 AND end_time > $2
            ORDER BY start_time
            "#,
        )
        .bind(establishment_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(appointments)
    }

    async fn is_employee_unavailable(
        &self,
        employee_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM appointments
                WHERE employee_id = $1 AND start_time < $3 AND end_time > $2
            )
            "#,
        )
        .bind(employee_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn save(&self, appointment: &Appointment) -> Result<Appointment> {
        let mut conn = self.pool.acquire().await?;
        upsert_appointment(&mut conn, appointment).await
    }

    async fn save_completed(
        &self,
        appointment: &Appointment,
        transaction: &Transaction,
    ) -> Result<(Appointment, Transaction)> {
        let mut tx = self.pool.begin().await?;

        let saved = upsert_appointment(&mut tx, appointment).await?;
        let recorded = upsert_transaction(&mut tx, transaction).await?;

        tx.commit().await?;
        Ok((saved, recorded))
    }
}

#[async_trait]
impl WebhookRepository for PgStore {
    async fn find_by_event_type(&self, event_type: &str) -> Result<Vec<Webhook>> {
        let webhooks: Vec<Webhook> =
            sqlx::query_as("SELECT * FROM webhooks WHERE event_type = $1 ORDER BY created_at")
                .bind(event_type)
                .fetch_all(&self.pool)
                .await?;
        Ok(webhooks)
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Webhook>> {
        let webhooks: Vec<Webhook> =
            sqlx::query_as("SELECT * FROM webhooks WHERE user_id = $1 ORDER BY created_at")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(webhooks)
    }
}

async fn upsert_appointment(
    conn: &mut PgConnection,
    appointment: &Appointment,
) -> Result<Appointment> {
    let saved: Appointment = sqlx::query_as(
        r#"
        INSERT INTO appointments (id, client_id, service_id, establishment_id, employee_id, start_time, end_time, status, client_notes, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (id) DO UPDATE
        SET service_id = EXCLUDED.service_id,
            employee_id = EXCLUDED.employee_id,
            start_time = EXCLUDED.start_time,
            end_time = EXCLUDED.end_time,
            status = EXCLUDED.status,
            client_notes = EXCLUDED.client_notes,
            updated_at = EXCLUDED.updated_at
        RETURNING *
        "#,
    )
    .bind(appointment.id)
    .bind(appointment.client_id)
    .bind(appointment.service_id)
    .bind(appointment.establishment_id)
    .bind(appointment.employee_id)
    .bind(appointment.start_time)
    .bind(appointment.end_time)
    .bind(appointment.status)
    .bind(&appointment.client_notes)
    .bind(appointment.created_at)
    .bind(appointment.updated_at)
    .fetch_one(&mut *conn)
    .await?;
    Ok(saved)
}

async fn upsert_transaction(
    conn: &mut PgConnection,
    transaction: &Transaction,
) -> Result<Transaction> {
    let saved: Transaction = sqlx::query_as(
        r#"
        INSERT INTO transactions (id, appointment_id, establishment_id, description, amount_cents, transaction_date, status, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (id) DO UPDATE
        SET description = EXCLUDED.description,
            amount_cents = EXCLUDED.amount_cents,
            transaction_date = EXCLUDED.transaction_date,
            status = EXCLUDED.status
        RETURNING *
        "#,
    )
    .bind(transaction.id)
    .bind(transaction.appointment_id)
    .bind(transaction.establishment_id)
    .bind(&transaction.description)
    .bind(transaction.amount_cents)
    .bind(transaction.transaction_date)
    .bind(transaction.status)
    .bind(transaction.created_at)
    .fetch_one(&mut *conn)
    .await?;
    Ok(saved)
}
