//! Storage capabilities consumed by the appointment lifecycle.
//!
//! Lookups return `Ok(None)` for a missing row; turning that into a
//! user-facing error is left to the caller, which knows which reference
//! was being resolved.

mod memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Appointment, Employee, Establishment, OfferedService, Transaction, User, Webhook,
};
use crate::error::Result;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
}

#[async_trait]
pub trait OfferedServiceRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<OfferedService>>;
}

#[async_trait]
pub trait EstablishmentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Establishment>>;
    async fn find_by_owner_id(&self, owner_id: Uuid) -> Result<Option<Establishment>>;
}

#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Employee>>;
}

/// Range lookups match every appointment whose window intersects the
/// half-open interval `[start, end)`.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>>;

    async fn find_by_client_in_range(
        &self,
        client_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>>;

    async fn find_by_establishment_in_range(
        &self,
        establishment_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>>;

    async fn is_employee_unavailable(
        &self,
        employee_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool>;

    /// Inserts or replaces the row with the same id.
    async fn save(&self, appointment: &Appointment) -> Result<Appointment>;

    /// Saves the appointment and inserts or replaces its transaction as one
    /// unit: either both rows are written or neither is.
    async fn save_completed(
        &self,
        appointment: &Appointment,
        transaction: &Transaction,
    ) -> Result<(Appointment, Transaction)>;
}

#[async_trait]
pub trait WebhookRepository: Send + Sync {
    async fn find_by_event_type(&self, event_type: &str) -> Result<Vec<Webhook>>;
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Webhook>>;
}

/// Every storage capability the appointment service needs, each behind its
/// own trait object so a single one can be swapped out in tests.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub services: Arc<dyn OfferedServiceRepository>,
    pub establishments: Arc<dyn EstablishmentRepository>,
    pub employees: Arc<dyn EmployeeRepository>,
    pub appointments: Arc<dyn AppointmentRepository>,
    pub webhooks: Arc<dyn WebhookRepository>,
}

impl Repositories {
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository
            + OfferedServiceRepository
            + EstablishmentRepository
            + EmployeeRepository
            + AppointmentRepository
            + WebhookRepository
            + 'static,
    {
        Self {
            users: store.clone(),
            services: store.clone(),
            establishments: store.clone(),
            employees: store.clone(),
            appointments: store.clone(),
            webhooks: store,
        }
    }
}
