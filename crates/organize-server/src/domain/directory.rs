use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Establishment {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Employee {
    pub id: Uuid,
    pub establishment_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A priced service bookable at an establishment.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct OfferedService {
    pub id: Uuid,
    pub establishment_id: Uuid,
    pub name: String,
    pub price_cents: i64,
    pub created_at: DateTime<Utc>,
}
