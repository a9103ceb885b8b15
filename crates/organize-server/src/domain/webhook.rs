use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookEvent {
    AppointmentCreated,
    StatusUpdated,
}

impl WebhookEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AppointmentCreated => "APPOINTMENT_CREATED",
            Self::StatusUpdated => "STATUS_UPDATED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Webhook {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_type: String,
    pub target_url: String,
    pub created_at: DateTime<Utc>,
}

impl Webhook {
    pub fn new(user_id: Uuid, event: WebhookEvent, target_url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            event_type: event.as_str().to_string(),
            target_url: target_url.into(),
            created_at: Utc::now(),
        }
    }

    pub fn listens_to(&self, event: WebhookEvent) -> bool {
        self.event_type == event.as_str()
    }
}
