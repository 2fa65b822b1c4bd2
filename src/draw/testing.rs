//! 内存版存储，仅供单元测试使用

use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::DbErr;

use super::DrawResult;
use super::store::{DrawStore, NewWinner, RaffleInfo, RaffleSnapshot, Ticket, WinnerRecord};
use crate::entities::TicketStatus;

pub(crate) fn ticket(number: i32, status: TicketStatus) -> Ticket {
    Ticket {
        id: number as i64,
        number,
        status,
        buyer_name: Some(format!("Buyer {number}")),
        buyer_phone: Some(format!("300000000{number}")),
        wins: vec![],
    }
}

pub(crate) fn paid(number: i32) -> Ticket {
    ticket(number, TicketStatus::Pagado)
}

pub(crate) fn reserved(number: i32) -> Ticket {
    ticket(number, TicketStatus::Apartado)
}

pub(crate) struct MemoryStore {
    raffle: RaffleInfo,
    tickets: Vec<Ticket>,
    winners: Mutex<Vec<WinnerRecord>>,
    next_id: AtomicI64,
    /// 批量写入第 N 条时模拟失败
    fail_on_insert: Option<usize>,
    frozen: Mutex<Option<RaffleSnapshot>>,
}

impl MemoryStore {
    pub(crate) fn new(raffle_id: &str, creator_id: &str, total: i32, tickets: Vec<Ticket>) -> Self {
        Self {
            raffle: RaffleInfo {
                id: raffle_id.to_string(),
                title: "Test raffle".to_string(),
                creator_id: creator_id.to_string(),
                total_tickets: total,
            },
            tickets,
            winners: Mutex::new(vec![]),
            next_id: AtomicI64::new(1),
            fail_on_insert: None,
            frozen: Mutex::new(None),
        }
    }

    pub(crate) fn fail_on_insert(mut self, nth: usize) -> Self {
        self.fail_on_insert = Some(nth);
        self
    }

    pub(crate) fn add_winner(&self, ticket_id: i64, is_manual: bool) {
        let record = self.record(ticket_id, is_manual, Utc::now());
        self.winners.lock().unwrap().push(record);
    }

    pub(crate) fn winner_count(&self) -> usize {
        self.winners.lock().unwrap().len()
    }

    /// 之后的读取都返回当前快照，模拟并发请求读到旧数据
    pub(crate) fn freeze_snapshot(&self) {
        let snapshot = self.build_snapshot();
        *self.frozen.lock().unwrap() = Some(snapshot);
    }

    pub(crate) fn thaw_snapshot(&self) {
        *self.frozen.lock().unwrap() = None;
    }

    fn record(&self, ticket_id: i64, is_manual: bool, won_at: chrono::DateTime<Utc>) -> WinnerRecord {
        WinnerRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            raffle_id: self.raffle.id.clone(),
            ticket_id,
            is_manual,
            won_at,
        }
    }

    fn build_snapshot(&self) -> RaffleSnapshot {
        let winners = self.winners.lock().unwrap();
        let tickets = self
            .tickets
            .iter()
            .cloned()
            .map(|mut t| {
                t.wins = winners
                    .iter()
                    .filter(|w| w.ticket_id == t.id)
                    .cloned()
                    .collect();
                t
            })
            .collect();
        RaffleSnapshot {
            raffle: self.raffle.clone(),
            tickets,
        }
    }
}

#[async_trait]
impl DrawStore for MemoryStore {
    async fn get_raffle_with_tickets_and_wins(
        &self,
        raffle_id: &str,
    ) -> DrawResult<Option<RaffleSnapshot>> {
        if raffle_id != self.raffle.id {
            return Ok(None);
        }
        if let Some(frozen) = self.frozen.lock().unwrap().clone() {
            return Ok(Some(frozen));
        }
        Ok(Some(self.build_snapshot()))
    }

    async fn create_winner_records(
        &self,
        _raffle_id: &str,
        entries: &[NewWinner],
    ) -> DrawResult<Vec<WinnerRecord>> {
        let mut staged = Vec::with_capacity(entries.len());
        for (i, e) in entries.iter().enumerate() {
            if self.fail_on_insert == Some(i + 1) {
                return Err(DbErr::Custom("simulated write failure".into()).into());
            }
            staged.push(self.record(e.ticket_id, e.is_manual, e.won_at));
        }
        self.winners.lock().unwrap().extend(staged.iter().cloned());
        Ok(staged)
    }

    async fn create_winner_record(
        &self,
        _raffle_id: &str,
        entry: NewWinner,
    ) -> DrawResult<WinnerRecord> {
        let record = self.record(entry.ticket_id, entry.is_manual, entry.won_at);
        self.winners.lock().unwrap().push(record.clone());
        Ok(record)
    }
}
