use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::draw::{
    DrawResult, DrawStore, NewWinner, RaffleInfo, RaffleSnapshot, Ticket, WinnerRecord,
};
use crate::entities::{
    raffle_entity as raffles, raffle_winner_entity as winners, ticket_entity as tickets,
};

impl From<winners::Model> for WinnerRecord {
    fn from(m: winners::Model) -> Self {
        WinnerRecord {
            id: m.id,
            raffle_id: m.raffle_id,
            ticket_id: m.ticket_id,
            is_manual: m.is_manual,
            won_at: m.won_at,
        }
    }
}

impl From<raffles::Model> for RaffleInfo {
    fn from(m: raffles::Model) -> Self {
        RaffleInfo {
            id: m.id,
            title: m.title,
            creator_id: m.creator_id,
            total_tickets: m.total_tickets,
        }
    }
}

fn to_ticket(m: tickets::Model, wins: Vec<WinnerRecord>) -> Ticket {
    Ticket {
        id: m.id,
        number: m.number,
        status: m.status,
        buyer_name: m.buyer_name,
        buyer_phone: m.buyer_phone,
        wins,
    }
}

/// 基于 SeaORM 的号码 / 中奖记录存储
///
/// 对连接类型泛型：既可以直接使用连接池，也可以在调用方开启的事务中使用，
/// 从而把“读取快照 + 写入中奖记录”包在同一个事务里。
pub struct SeaOrmDrawStore<'a, C> {
    conn: &'a C,
}

impl<'a, C> SeaOrmDrawStore<'a, C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn find_raffle(&self, raffle_id: &str) -> DrawResult<Option<RaffleInfo>> {
        let raffle = raffles::Entity::find_by_id(raffle_id.to_owned())
            .one(self.conn)
            .await?;
        Ok(raffle.map(Into::into))
    }

    /// 完整中奖历史（从新到旧），号码已删除时 ticket 为 None
    pub async fn list_winner_history(
        &self,
        raffle_id: &str,
    ) -> DrawResult<Vec<(WinnerRecord, Option<Ticket>)>> {
        let rows = winners::Entity::find()
            .filter(winners::Column::RaffleId.eq(raffle_id))
            .find_also_related(tickets::Entity)
            .order_by_desc(winners::Column::WonAt)
            .order_by_desc(winners::Column::Id)
            .all(self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(w, t)| (w.into(), t.map(|t| to_ticket(t, vec![]))))
            .collect())
    }
}

#[async_trait]
impl<'a, C> DrawStore for SeaOrmDrawStore<'a, C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    async fn get_raffle_with_tickets_and_wins(
        &self,
        raffle_id: &str,
    ) -> DrawResult<Option<RaffleSnapshot>> {
        let Some(raffle) = raffles::Entity::find_by_id(raffle_id.to_owned())
            .one(self.conn)
            .await?
        else {
            return Ok(None);
        };

        let ticket_models = tickets::Entity::find()
            .filter(tickets::Column::RaffleId.eq(raffle_id))
            .order_by_asc(tickets::Column::Number)
            .all(self.conn)
            .await?;

        let win_models = winners::Entity::find()
            .filter(winners::Column::RaffleId.eq(raffle_id))
            .order_by_desc(winners::Column::WonAt)
            .all(self.conn)
            .await?;

        let mut wins_by_ticket: HashMap<i64, Vec<WinnerRecord>> = HashMap::new();
        for w in win_models {
            wins_by_ticket
                .entry(w.ticket_id)
                .or_default()
                .push(w.into());
        }

        let tickets = ticket_models
            .into_iter()
            .map(|t| {
                let wins = wins_by_ticket.remove(&t.id).unwrap_or_default();
                to_ticket(t, wins)
            })
            .collect();

        Ok(Some(RaffleSnapshot {
            raffle: raffle.into(),
            tickets,
        }))
    }

    async fn create_winner_records(
        &self,
        raffle_id: &str,
        entries: &[NewWinner],
    ) -> DrawResult<Vec<WinnerRecord>> {
        // 在外层事务中时为 SAVEPOINT；任一条失败 txn 被 drop 即回滚
        let txn = self.conn.begin().await?;

        let mut created = Vec::with_capacity(entries.len());
        for e in entries {
            let model = winners::ActiveModel {
                raffle_id: Set(raffle_id.to_owned()),
                ticket_id: Set(e.ticket_id),
                is_manual: Set(e.is_manual),
                won_at: Set(e.won_at),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            created.push(model.into());
        }

        txn.commit().await?;
        Ok(created)
    }

    async fn create_winner_record(
        &self,
        raffle_id: &str,
        entry: NewWinner,
    ) -> DrawResult<WinnerRecord> {
        let model = winners::ActiveModel {
            raffle_id: Set(raffle_id.to_owned()),
            ticket_id: Set(entry.ticket_id),
            is_manual: Set(entry.is_manual),
            won_at: Set(entry.won_at),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;
        Ok(model.into())
    }
}
