pub use sea_orm_migration::prelude::*;

mod m20260710_000001_create_contacts;
mod m20260710_000002_create_orders;
mod m20260710_000003_create_payments;
mod m20260711_000001_create_payment_reminders;
mod m20260711_000002_create_order_sequences;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260710_000001_create_contacts::Migration),
            Box::new(m20260710_000002_create_orders::Migration),
            Box::new(m20260710_000003_create_payments::Migration),
            Box::new(m20260711_000001_create_payment_reminders::Migration),
            Box::new(m20260711_000002_create_order_sequences::Migration),
        ]
    }
}
