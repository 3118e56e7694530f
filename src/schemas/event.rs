use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::event::{self, EventType};
use crate::services::events::EventInput;

/// Admin create/update payload. `image` is a URL.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct EventRequest {
    #[validate(length(min = 1, max = 200, message = "event_name is required"))]
    pub event_name: String,
    #[validate(length(min = 1, max = 200, message = "location is required"))]
    pub location: String,
    #[serde(default)]
    pub description: String,
    pub event_date: DateTime<Utc>,
    pub event_type: EventType,
    #[validate(range(min = 0, message = "ticket_available cannot be negative"))]
    pub ticket_available: i32,
    #[validate(range(min = 0, message = "price cannot be negative"))]
    pub price: i64,
    #[validate(url(message = "image must be a URL"))]
    pub image: Option<String>,
}

impl From<EventRequest> for EventInput {
    fn from(req: EventRequest) -> Self {
        Self {
            event_name: req.event_name,
            location: req.location,
            description: req.description,
            event_date: req.event_date,
            event_type: req.event_type,
            ticket_available: req.ticket_available,
            price: req.price,
            image: req.image,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventResponse {
    pub id: i64,
    pub event_name: String,
    pub location: String,
    pub description: String,
    pub event_date: DateTime<Utc>,
    pub event_type: EventType,
    pub ticket_available: i32,
    pub price: i64,
    /// Equal to `price` until a user's points are applied
    pub discounted_price: i64,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<event::Model> for EventResponse {
    fn from(e: event::Model) -> Self {
        Self {
            id: e.id,
            event_name: e.event_name,
            location: e.location,
            description: e.description,
            event_date: e.event_date,
            event_type: e.event_type,
            ticket_available: e.ticket_available,
            price: e.price,
            discounted_price: e.price,
            image: e.image,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    pub term: Option<String>,
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(image: Option<&str>) -> EventRequest {
        EventRequest {
            event_name: "Batik Today".to_string(),
            location: "Jakarta".to_string(),
            description: String::new(),
            event_date: Utc::now(),
            event_type: EventType::Exhibition,
            ticket_available: 10,
            price: 5_000,
            image: image.map(str::to_string),
        }
    }

    #[test]
    fn test_image_must_be_url_when_present() {
        assert!(request(None).validate().is_ok());
        assert!(request(Some("https://cdn.example.com/a.jpg")).validate().is_ok());

        let errors = request(Some("")).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("image"));
    }
}
