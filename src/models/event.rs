use sea_orm::entity::prelude::*;
use sea_orm::Iterable;
use serde::{Deserialize, Serialize};

/// Event category. `Completed` marks an event that is over and closed for booking.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum)]
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum EventType {
    #[sea_orm(string_value = "Exhibition")]
    #[default]
    Exhibition,
    #[sea_orm(string_value = "Theater")]
    Theater,
    #[sea_orm(string_value = "Festival")]
    Festival,
    #[sea_orm(string_value = "Performing")]
    Performing,
    #[sea_orm(string_value = "Completed")]
    Completed,
}

impl EventType {
    pub fn is_bookable(&self) -> bool {
        *self != EventType::Completed
    }

    /// Parse a category name, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        EventType::iter().find(|t| t.to_string().eq_ignore_ascii_case(value.trim()))
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Exhibition => write!(f, "Exhibition"),
            EventType::Theater => write!(f, "Theater"),
            EventType::Festival => write!(f, "Festival"),
            EventType::Performing => write!(f, "Performing"),
            EventType::Completed => write!(f, "Completed"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub event_name: String,
    pub location: String,
    pub description: String,
    pub event_date: DateTimeUtc,
    pub event_type: EventType,
    pub ticket_available: i32,
    pub price: i64,
    pub image: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
