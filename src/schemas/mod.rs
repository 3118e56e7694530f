pub mod booking;
pub mod common;
pub mod event;
pub mod stats;
pub mod user;

pub use booking::*;
pub use common::*;
pub use event::*;
pub use stats::*;
pub use user::*;
