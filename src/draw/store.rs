use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::DrawResult;
use crate::entities::TicketStatus;

/// 中奖记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinnerRecord {
    pub id: i64,
    pub raffle_id: String,
    pub ticket_id: i64,
    pub is_manual: bool,
    pub won_at: DateTime<Utc>,
}

/// 号码及其中奖历史
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: i64,
    pub number: i32,
    pub status: TicketStatus,
    pub buyer_name: Option<String>,
    pub buyer_phone: Option<String>,
    pub wins: Vec<WinnerRecord>,
}

impl Ticket {
    pub fn is_paid(&self) -> bool {
        self.status == TicketStatus::Pagado
    }

    pub fn has_random_win(&self) -> bool {
        self.wins.iter().any(|w| !w.is_manual)
    }

    pub fn has_manual_win(&self) -> bool {
        self.wins.iter().any(|w| w.is_manual)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaffleInfo {
    pub id: String,
    pub title: String,
    pub creator_id: String,
    pub total_tickets: i32,
}

/// 一次读取得到的抽奖快照（抽奖 + 全部号码 + 各号码中奖历史）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaffleSnapshot {
    pub raffle: RaffleInfo,
    pub tickets: Vec<Ticket>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWinner {
    pub ticket_id: i64,
    pub is_manual: bool,
    pub won_at: DateTime<Utc>,
}

/// 号码 / 中奖记录存储
#[async_trait]
pub trait DrawStore: Send + Sync {
    async fn get_raffle_with_tickets_and_wins(
        &self,
        raffle_id: &str,
    ) -> DrawResult<Option<RaffleSnapshot>>;

    /// 批量写入，要么全部成功要么全部回滚
    async fn create_winner_records(
        &self,
        raffle_id: &str,
        entries: &[NewWinner],
    ) -> DrawResult<Vec<WinnerRecord>>;

    async fn create_winner_record(
        &self,
        raffle_id: &str,
        entry: NewWinner,
    ) -> DrawResult<WinnerRecord>;
}

#[async_trait]
impl<S: DrawStore + ?Sized> DrawStore for &S {
    async fn get_raffle_with_tickets_and_wins(
        &self,
        raffle_id: &str,
    ) -> DrawResult<Option<RaffleSnapshot>> {
        (**self).get_raffle_with_tickets_and_wins(raffle_id).await
    }

    async fn create_winner_records(
        &self,
        raffle_id: &str,
        entries: &[NewWinner],
    ) -> DrawResult<Vec<WinnerRecord>> {
        (**self).create_winner_records(raffle_id, entries).await
    }

    async fn create_winner_record(
        &self,
        raffle_id: &str,
        entry: NewWinner,
    ) -> DrawResult<WinnerRecord> {
        (**self).create_winner_record(raffle_id, entry).await
    }
}
