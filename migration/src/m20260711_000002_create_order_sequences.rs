use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One counter row per calendar year; order numbers are allocated by
        // incrementing last_value inside a transaction.
        manager
            .create_table(
                Table::create()
                    .table(OrderSequences::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrderSequences::Year)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OrderSequences::LastValue)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(OrderSequences::UpdatedAt)
                            .timestamp()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrderSequences::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum OrderSequences {
    Table,
    Year,
    LastValue,
    UpdatedAt,
}
