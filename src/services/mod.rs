pub mod booking_state;
pub mod bookings;
pub mod events;
pub mod points;
pub mod referral;
pub mod reviews;
pub mod security;
pub mod statistics;

pub use booking_state::BookingTransition;
pub use points::{quote, PointsQuote};
