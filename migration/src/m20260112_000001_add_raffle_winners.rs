use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Raffles {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Tickets {
    Table,
    Id,
}

/// Raffle Winners (中奖记录)
/// - is_manual: 管理员手动指定的中奖者
/// - 同一批随机抽取的中奖者共享同一个 won_at
#[derive(DeriveIden)]
enum RaffleWinners {
    Table,
    Id,
    RaffleId,
    TicketId,
    IsManual,
    WonAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RaffleWinners::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RaffleWinners::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RaffleWinners::RaffleId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RaffleWinners::TicketId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RaffleWinners::IsManual)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(RaffleWinners::WonAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_raffle_winners_raffle_id")
                            .from(RaffleWinners::Table, RaffleWinners::RaffleId)
                            .to(Raffles::Table, Raffles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    // 删除 ticket 时级联删除其中奖记录
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_raffle_winners_ticket_id")
                            .from(RaffleWinners::Table, RaffleWinners::TicketId)
                            .to(Tickets::Table, Tickets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_raffle_winners_raffle_won_at")
                    .table(RaffleWinners::Table)
                    .col(RaffleWinners::RaffleId)
                    .col(RaffleWinners::WonAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_raffle_winners_ticket_id")
                    .table(RaffleWinners::Table)
                    .col(RaffleWinners::TicketId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(RaffleWinners::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}
