pub mod payment_reminder_sync;
