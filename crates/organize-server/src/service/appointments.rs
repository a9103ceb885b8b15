//! Appointment lifecycle: range queries, conflict-checked booking and status
//! changes with their side effects.
//!
//! Every lookup and check, webhook lookups included, runs before the first
//! write, so a failing step never leaves a partial record behind. A
//! completed appointment and its transaction are saved as one unit.
//!
//! The availability check and the save that follows are not atomic; two
//! concurrent bookings of the same slot can both pass the check.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{
    Appointment, AppointmentStatus, CreateAppointmentRequest, Transaction, WebhookEvent,
};
use crate::error::{AppError, Result};
use crate::repository::Repositories;
use crate::workers::WebhookDispatcher;

#[derive(Clone)]
pub struct AppointmentService {
    repos: Repositories,
    dispatcher: Arc<dyn WebhookDispatcher>,
}

impl AppointmentService {
    pub fn new(repos: Repositories, dispatcher: Arc<dyn WebhookDispatcher>) -> Self {
        Self { repos, dispatcher }
    }

    pub async fn list_for_client(
        &self,
        client_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        self.repos
            .appointments
            .find_by_client_in_range(client_id, start, end)
            .await
    }

    pub async fn list_for_owner(
        &self,
        owner_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        let establishment = self
            .repos
            .establishments
            .find_by_owner_id(owner_id)
            .await?
            .ok_or(AppError::EstablishmentNotFoundForOwner(owner_id))?;

        self.repos
            .appointments
            .find_by_establishment_in_range(establishment.id, start, end)
            .await
    }

    pub async fn create(
        &self,
        req: CreateAppointmentRequest,
        user_id: Uuid,
    ) -> Result<Appointment> {
        let client = self
            .repos
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound(user_id))?;

        let service = self
            .repos
            .services
            .find_by_id(req.service_id)
            .await?
            .ok_or(AppError::ServiceNotFound(req.service_id))?;

        let establishment = self
            .repos
            .establishments
            .find_by_id(req.establishment_id)
            .await?
            .ok_or(AppError::EstablishmentNotFound(req.establishment_id))?;

        let employee = self
            .repos
            .employees
            .find_by_id(req.employee_id)
            .await?
            .ok_or(AppError::EmployeeNotFound(req.employee_id))?;

        let unavailable = self
            .repos
            .appointments
            .is_employee_unavailable(employee.id, req.start_time, req.end_time)
            .await?;

        if unavailable {
            info!(
                employee_id = %employee.id,
                start_time = %req.start_time,
                end_time = %req.end_time,
                "booking rejected, employee unavailable"
            );
            return Err(AppError::EmployeeUnavailable {
                employee_id: employee.id,
                start_time: req.start_time,
                end_time: req.end_time,
            });
        }

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            client_id: client.id,
            service_id: Some(service.id),
            establishment_id: establishment.id,
            employee_id: employee.id,
            start_time: req.start_time,
            end_time: req.end_time,
            status: req.status.unwrap_or(AppointmentStatus::Pending),
            client_notes: req.client_notes,
            created_at: now,
            updated_at: now,
        };

        let event = WebhookEvent::AppointmentCreated;
        let webhooks = self.repos.webhooks.find_by_event_type(event.as_str()).await?;

        let saved = self.repos.appointments.save(&appointment).await?;
        info!(appointment_id = %saved.id, status = %saved.status, "appointment created");

        self.dispatcher.dispatch(
            &webhooks,
            &json!({
                "event": event.as_str(),
                "appointmentId": saved.id,
                "clientName": client.name,
                "startTime": saved.start_time,
            }),
        );

        Ok(saved)
    }

    /// Sets any status from any other. Completing an appointment that has a
    /// service records a paid transaction, including when it was already
    /// completed before.
    pub async fn update_status(&self, id: Uuid, status: &str) -> Result<Appointment> {
        let mut appointment = self
            .repos
            .appointments
            .find_by_id(id)
            .await?
            .ok_or(AppError::AppointmentNotFound(id))?;

        let new_status: AppointmentStatus = status
            .parse()
            .map_err(|_| AppError::InvalidStatus(status.to_string()))?;

        let billed_service = match (new_status, appointment.service_id) {
            (AppointmentStatus::Completed, Some(service_id)) => {
                self.repos.services.find_by_id(service_id).await?
            }
            _ => None,
        };

        let event = WebhookEvent::StatusUpdated;
        let webhooks: Vec<_> = self
            .repos
            .webhooks
            .find_by_user(appointment.client_id)
            .await?
            .into_iter()
            .filter(|w| w.listens_to(event))
            .collect();

        if new_status == AppointmentStatus::Completed
            && appointment.status == AppointmentStatus::Completed
        {
            warn!(
                appointment_id = %appointment.id,
                "appointment completed again, another transaction will be recorded"
            );
        }

        appointment.status = new_status;
        appointment.updated_at = Utc::now();

        let saved = match billed_service {
            Some(service) => {
                let transaction = Transaction::for_completed(&appointment, &service);
                let (saved, transaction) = self
                    .repos
                    .appointments
                    .save_completed(&appointment, &transaction)
                    .await?;
                info!(
                    appointment_id = %saved.id,
                    transaction_id = %transaction.id,
                    amount_cents = transaction.amount_cents,
                    "transaction recorded for completed appointment"
                );
                saved
            }
            None => self.repos.appointments.save(&appointment).await?,
        };

        self.dispatcher.dispatch(
            &webhooks,
            &json!({
                "event": event.as_str(),
                "appointmentId": saved.id,
                "newStatus": saved.status.as_str(),
            }),
        );

        Ok(saved)
    }
}
