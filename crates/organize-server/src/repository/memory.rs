use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AppointmentRepository, EmployeeRepository, EstablishmentRepository, OfferedServiceRepository,
    UserRepository, WebhookRepository,
};
use crate::domain::{
    Appointment, Employee, Establishment, OfferedService, Transaction, User, Webhook,
};
use crate::error::Result;

/// Map-backed store with the same lookup semantics as [`super::PgStore`].
///
/// Used in place of Postgres when exercising the appointment lifecycle in
/// tests. The `insert_*` helpers seed the read-only directory tables.
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    services: RwLock<HashMap<Uuid, OfferedService>>,
    establishments: RwLock<HashMap<Uuid, Establishment>>,
    employees: RwLock<HashMap<Uuid, Employee>>,
    appointments: RwLock<HashMap<Uuid, Appointment>>,
    transactions: RwLock<Vec<Transaction>>,
    webhooks: RwLock<Vec<Webhook>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn insert_service(&self, service: OfferedService) {
        self.services.write().await.insert(service.id, service);
    }

    pub async fn remove_service(&self, id: Uuid) {
        self.services.write().await.remove(&id);
    }

    pub async fn insert_establishment(&self, establishment: Establishment) {
        self.establishments
            .write()
            .await
            .insert(establishment.id, establishment);
    }

    pub async fn insert_employee(&self, employee: Employee) {
        self.employees.write().await.insert(employee.id, employee);
    }

    pub async fn insert_appointment(&self, appointment: Appointment) {
        self.appointments
            .write()
            .await
            .insert(appointment.id, appointment);
    }

    pub async fn insert_webhook(&self, webhook: Webhook) {
        self.webhooks.write().await.push(webhook);
    }

    pub async fn appointments(&self) -> Vec<Appointment> {
        let mut all: Vec<Appointment> = self.appointments.read().await.values().cloned().collect();
        all.sort_by_key(|a| a.start_time);
        all
    }

    pub async fn transactions(&self) -> Vec<Transaction> {
        self.transactions.read().await.clone()
    }

    async fn appointments_matching<F>(&self, predicate: F) -> Vec<Appointment>
    where
        F: Fn(&Appointment) -> bool,
    {
        let mut found: Vec<Appointment> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| predicate(*a))
            .cloned()
            .collect();
        found.sort_by_key(|a| a.start_time);
        found
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl OfferedServiceRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<OfferedService>> {
        Ok(self.services.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl EstablishmentRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Establishment>> {
        Ok(self.establishments.read().await.get(&id).cloned())
    }

    async fn find_by_owner_id(&self, owner_id: Uuid) -> Result<Option<Establishment>> {
        Ok(self
            .establishments
            .read()
            .await
            .values()
            .filter(|e| e.owner_id == owner_id)
            .min_by_key(|e| e.created_at)
            .cloned())
    }
}

#[async_trait]
impl EmployeeRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Employee>> {
        Ok(self.employees.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>> {
        Ok(self.appointments.read().await.get(&id).cloned())
    }

    async fn find_by_client_in_range(
        &self,
        client_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        Ok(self
            .appointments_matching(|a| a.client_id == client_id && a.overlaps(start, end))
            .await)
    }

    async fn find_by_establishment_in_range(
        &self,
        establishment_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        Ok(self
            .appointments_matching(|a| {
                a.establishment_id == establishment_id && a.overlaps(start, end)
            })
            .await)
    }

    async fn is_employee_unavailable(
        &self,
        employee_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool> {
        Ok(self
            .appointments
            .read()
            .await
            .values()
            .any(|a| a.employee_id == employee_id && a.overlaps(start, end)))
    }

    async fn save(&self, appointment: &Appointment) -> Result<Appointment> {
        self.appointments
            .write()
            .await
            .insert(appointment.id, appointment.clone());
        Ok(appointment.clone())
    }

    async fn save_completed(
        &self,
        appointment: &Appointment,
        transaction: &Transaction,
    ) -> Result<(Appointment, Transaction)> {
        let mut appointments = self.appointments.write().await;
        let mut transactions = self.transactions.write().await;

        appointments.insert(appointment.id, appointment.clone());
        match transactions.iter_mut().find(|t| t.id == transaction.id) {
            Some(existing) => *existing = transaction.clone(),
            None => transactions.push(transaction.clone()),
        }

        Ok((appointment.clone(), transaction.clone()))
    }
}

#[async_trait]
impl WebhookRepository for InMemoryStore {
    async fn find_by_event_type(&self, event_type: &str) -> Result<Vec<Webhook>> {
        Ok(self
            .webhooks
            .read()
            .await
            .iter()
            .filter(|w| w.event_type == event_type)
            .cloned()
            .collect())
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Webhook>> {
        Ok(self
            .webhooks
            .read()
            .await
            .iter()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect())
    }
}
