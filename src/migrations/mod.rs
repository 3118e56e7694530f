pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_users;
mod m20261001_000002_create_referral_codes;
mod m20261001_000003_create_events;
mod m20261001_000004_create_bookings;
mod m20261001_000005_create_payments;
mod m20261001_000006_create_reviews;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_users::Migration),
            Box::new(m20261001_000002_create_referral_codes::Migration),
            Box::new(m20261001_000003_create_events::Migration),
            Box::new(m20261001_000004_create_bookings::Migration),
            Box::new(m20261001_000005_create_payments::Migration),
            Box::new(m20261001_000006_create_reviews::Migration),
        ]
    }
}
