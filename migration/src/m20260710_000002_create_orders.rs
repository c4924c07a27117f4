use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Orders::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Orders::OrderNumber)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Orders::ContactId).integer().not_null())
                    .col(
                        ColumnDef::new(Orders::Status)
                            .string_len(20)
                            .not_null()
                            .default("DRAFT"),
                    )
                    .col(ColumnDef::new(Orders::TotalAmount).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(Orders::DueDate).date())
                    .col(
                        ColumnDef::new(Orders::PaymentStatus)
                            .string_len(20)
                            .not_null()
                            .default("UNPAID"),
                    )
                    .col(ColumnDef::new(Orders::Notes).text())
                    .col(ColumnDef::new(Orders::DeliveryAddress).text())
                    .col(ColumnDef::new(Orders::CancellationReason).text())
                    .col(ColumnDef::new(Orders::CancelledAt).timestamp())
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .col(
                        ColumnDef::new(Orders::UpdatedAt)
                            .timestamp()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_orders_contact_id")
                    .from(Orders::Table, Orders::ContactId)
                    .to(Contacts::Table, Contacts::Id)
                    .on_delete(ForeignKeyAction::Restrict)
                    .to_owned(),
            )
            .await?;

        // The reminder scan filters on status + payment_status + due_date
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_reminder_scan")
                    .table(Orders::Table)
                    .col(Orders::Status)
                    .col(Orders::PaymentStatus)
                    .col(Orders::DueDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    OrderNumber,
    ContactId,
    Status,
    TotalAmount,
    DueDate,
    PaymentStatus,
    Notes,
    DeliveryAddress,
    CancellationReason,
    CancelledAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Contacts {
    Table,
    Id,
}
