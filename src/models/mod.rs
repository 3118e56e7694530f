pub mod booking;
pub mod event;
pub mod payment;
pub mod referral_code;
pub mod review;
pub mod user;

