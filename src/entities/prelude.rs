pub use super::contacts::Entity as Contacts;
pub use super::order_sequences::Entity as OrderSequences;
pub use super::orders::Entity as Orders;
pub use super::payment_reminders::Entity as PaymentReminders;
pub use super::payments::Entity as Payments;
