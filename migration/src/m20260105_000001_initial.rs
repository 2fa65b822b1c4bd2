use sea_orm_migration::prelude::*;

/// Raffles (rifas)
#[derive(DeriveIden)]
enum Raffles {
    Table,
    Id,
    Title,
    Description,
    PriceCents,
    TotalTickets,
    EndDate,
    Status,
    CreatorId,
    CreatedAt,
    UpdatedAt,
}

/// Tickets (boletas)
#[derive(DeriveIden)]
enum Tickets {
    Table,
    Id,
    RaffleId,
    Number,
    Status,
    BuyerName,
    BuyerPhone,
    BuyerEmail,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// status 使用字符串存储 (ACTIVE / COMPLETED, APARTADO / REVISANDO / PAGADO)，
/// 兼容 Postgres 与 SQLite
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Raffles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Raffles::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Raffles::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Raffles::Description).text().null())
                    .col(
                        ColumnDef::new(Raffles::PriceCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Raffles::TotalTickets).integer().not_null())
                    .col(
                        ColumnDef::new(Raffles::EndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Raffles::Status)
                            .string_len(16)
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(ColumnDef::new(Raffles::CreatorId).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Raffles::CreatedAt)
                            .timestamp_with_time_zone()
                            .null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Raffles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_raffles_creator_id")
                    .table(Raffles::Table)
                    .col(Raffles::CreatorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tickets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tickets::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tickets::RaffleId).string_len(64).not_null())
                    .col(ColumnDef::new(Tickets::Number).integer().not_null())
                    .col(
                        ColumnDef::new(Tickets::Status)
                            .string_len(16)
                            .not_null()
                            .default("APARTADO"),
                    )
                    .col(ColumnDef::new(Tickets::BuyerName).string_len(255).null())
                    .col(ColumnDef::new(Tickets::BuyerPhone).string_len(32).null())
                    .col(ColumnDef::new(Tickets::BuyerEmail).string_len(255).null())
                    .col(
                        ColumnDef::new(Tickets::CreatedAt)
                            .timestamp_with_time_zone()
                            .null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_raffle_id")
                            .from(Tickets::Table, Tickets::RaffleId)
                            .to(Raffles::Table, Raffles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一场抽奖内号码唯一
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tickets_raffle_number_unique")
                    .table(Tickets::Table)
                    .col(Tickets::RaffleId)
                    .col(Tickets::Number)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tickets::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Raffles::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
