use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Append-only audit log of reminder delivery attempts
        manager
            .create_table(
                Table::create()
                    .table(PaymentReminders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaymentReminders::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PaymentReminders::OrderId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentReminders::Channel)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PaymentReminders::Destination).string_len(200))
                    .col(ColumnDef::new(PaymentReminders::Message).text())
                    .col(
                        ColumnDef::new(PaymentReminders::Success)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(PaymentReminders::ProviderMessageId).string_len(100))
                    .col(ColumnDef::new(PaymentReminders::RawResponse).text())
                    .col(ColumnDef::new(PaymentReminders::Error).text())
                    .col(ColumnDef::new(PaymentReminders::SentDate).date().not_null())
                    .col(ColumnDef::new(PaymentReminders::SentAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_payment_reminders_order_id")
                    .from(PaymentReminders::Table, PaymentReminders::OrderId)
                    .to(Orders::Table, Orders::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        // The per-day de-duplication check looks up (order_id, sent_date)
        manager
            .create_index(
                Index::create()
                    .name("idx_payment_reminders_order_day")
                    .table(PaymentReminders::Table)
                    .col(PaymentReminders::OrderId)
                    .col(PaymentReminders::SentDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PaymentReminders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PaymentReminders {
    Table,
    Id,
    OrderId,
    Channel,
    Destination,
    Message,
    Success,
    ProviderMessageId,
    RawResponse,
    Error,
    SentDate,
    SentAt,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
}
