//! Booking lifecycle.
//!
//! ```text
//! pending --Pay--> completed
//! pending --Cancel--> cancelled
//! ```
//!
//! Both `completed` and `cancelled` are terminal.

use serde::{Deserialize, Serialize};

use crate::error::BookingStateError;
use crate::models::booking::BookingStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingTransition {
    Pay,
    Cancel,
}

impl std::fmt::Display for BookingTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingTransition::Pay => write!(f, "pay"),
            BookingTransition::Cancel => write!(f, "cancel"),
        }
    }
}

impl BookingStatus {
    /// Next status after `transition`, or an error naming the rejected move.
    pub fn apply(self, transition: BookingTransition) -> Result<BookingStatus, BookingStateError> {
        match (self, transition) {
            (BookingStatus::Pending, BookingTransition::Pay) => Ok(BookingStatus::Completed),
            (BookingStatus::Pending, BookingTransition::Cancel) => Ok(BookingStatus::Cancelled),
            (from, transition) => Err(BookingStateError::InvalidTransition { from, transition }),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, BookingStatus::Pending)
    }
}
