use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Appointment, OfferedService};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Paid,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub establishment_id: Uuid,
    pub description: String,
    pub amount_cents: i64,
    pub transaction_date: NaiveDate,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Payment record for a completed appointment, dated today (UTC).
    pub fn for_completed(appointment: &Appointment, service: &OfferedService) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            appointment_id: appointment.id,
            establishment_id: appointment.establishment_id,
            description: service.name.clone(),
            amount_cents: service.price_cents,
            transaction_date: now.date_naive(),
            status: TransactionStatus::Paid,
            created_at: now,
        }
    }
}
