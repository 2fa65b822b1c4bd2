use std::num::NonZeroU32;

use chrono::Utc;
use rand::Rng;
use rand::seq::SliceRandom;

use super::eligibility::resolve_eligible;
use super::store::{DrawStore, NewWinner, RaffleSnapshot, Ticket, WinnerRecord};
use super::{DrawError, DrawResult};
use crate::models::Caller;

/// 随机抽奖参数（已在边界完成校验）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawOptions {
    pub winners_count: NonZeroU32,
    pub require_paid: bool,
}

impl DrawOptions {
    pub fn new(winners_count: i64, require_paid: bool) -> DrawResult<Self> {
        let invalid = || DrawError::InvalidInput("Winners count must be a positive number".into());
        if winners_count <= 0 {
            return Err(invalid());
        }
        // 超出 u32 的人数按上限处理，抽奖时再截断到可参与数量
        let winners_count =
            NonZeroU32::new(u32::try_from(winners_count).unwrap_or(u32::MAX)).ok_or_else(invalid)?;
        Ok(Self {
            winners_count,
            require_paid,
        })
    }
}

/// 新写入的中奖记录及其对应号码
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawnWinner {
    pub record: WinnerRecord,
    pub ticket: Ticket,
}

/// 均匀无放回抽样 (Fisher-Yates)
pub fn sample_winners<R: Rng + ?Sized>(
    mut eligible: Vec<Ticket>,
    count: usize,
    rng: &mut R,
) -> Vec<Ticket> {
    eligible.shuffle(rng);
    eligible.truncate(count);
    eligible
}

pub struct DrawEngine<S> {
    store: S,
    reject_duplicate_manual: bool,
}

impl<S: DrawStore> DrawEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            reject_duplicate_manual: false,
        }
    }

    /// 开启后，同一号码不允许再次手动中奖（默认关闭）
    pub fn reject_duplicate_manual(mut self, enabled: bool) -> Self {
        self.reject_duplicate_manual = enabled;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 随机抽奖
    ///
    /// 逻辑:
    /// 1. 读取抽奖、号码及中奖历史，并校验创建者/管理员权限
    /// 2. 过滤可参与号码（排除已随机中奖，可选仅已付款）
    /// 3. 人数超过可参与数量时截断，不报错
    /// 4. 均匀无放回抽样
    /// 5. 同一时间戳批量写入（事务，全部成功或全部回滚）
    pub async fn draw_random(
        &self,
        raffle_id: &str,
        options: &DrawOptions,
        caller: &Caller,
    ) -> DrawResult<Vec<DrawnWinner>> {
        let snapshot = self.load_authorized(raffle_id, caller).await?;

        let eligible = resolve_eligible(&snapshot.tickets, options.require_paid);
        if eligible.is_empty() {
            return Err(DrawError::NoEligibleTickets {
                require_paid: options.require_paid,
            });
        }

        let count = (options.winners_count.get() as usize).min(eligible.len());
        let selected = {
            let mut rng = rand::rng();
            sample_winners(eligible, count, &mut rng)
        };

        let won_at = Utc::now();
        let entries: Vec<NewWinner> = selected
            .iter()
            .map(|t| NewWinner {
                ticket_id: t.id,
                is_manual: false,
                won_at,
            })
            .collect();

        let records = self
            .store
            .create_winner_records(raffle_id, &entries)
            .await?;

        log::info!(
            "Raffle {raffle_id}: drew {} winner(s) (requested {}, paid only: {}) by {}",
            records.len(),
            options.winners_count,
            options.require_paid,
            caller.user_id
        );

        Ok(pair_with_tickets(records, selected))
    }

    /// 手动指定中奖号码
    pub async fn draw_manual(
        &self,
        raffle_id: &str,
        ticket_number: Option<i64>,
        require_paid: bool,
        caller: &Caller,
    ) -> DrawResult<DrawnWinner> {
        let number = match ticket_number {
            Some(n) if n != 0 => n,
            _ => {
                return Err(DrawError::InvalidInput(
                    "You must enter a ticket number".into(),
                ));
            }
        };

        let snapshot = self.load_authorized(raffle_id, caller).await?;

        let ticket = snapshot
            .tickets
            .into_iter()
            .find(|t| i64::from(t.number) == number)
            .ok_or(DrawError::TicketNotRegistered(number))?;
        let number = ticket.number;

        if require_paid && !ticket.is_paid() {
            return Err(DrawError::TicketNotPaid {
                number,
                status: ticket.status,
            });
        }

        // 已随机中奖的号码仍可手动中奖
        if self.reject_duplicate_manual && ticket.has_manual_win() {
            log::warn!("Raffle {raffle_id}: number {number} is already a manual winner");
            return Err(DrawError::AlreadyManualWinner(number));
        }

        let record = self
            .store
            .create_winner_record(
                raffle_id,
                NewWinner {
                    ticket_id: ticket.id,
                    is_manual: true,
                    won_at: Utc::now(),
                },
            )
            .await?;

        log::info!(
            "Raffle {raffle_id}: number {number} registered as manual winner by {}",
            caller.user_id
        );

        Ok(DrawnWinner { record, ticket })
    }

    async fn load_authorized(&self, raffle_id: &str, caller: &Caller) -> DrawResult<RaffleSnapshot> {
        let snapshot = self
            .store
            .get_raffle_with_tickets_and_wins(raffle_id)
            .await?
            .ok_or_else(|| DrawError::NotFound("Raffle not found".into()))?;

        if !caller.can_manage(&snapshot.raffle.creator_id) {
            log::warn!(
                "User {} tried to draw raffle {raffle_id} without permission",
                caller.user_id
            );
            return Err(DrawError::Forbidden);
        }
        Ok(snapshot)
    }
}

fn pair_with_tickets(records: Vec<WinnerRecord>, tickets: Vec<Ticket>) -> Vec<DrawnWinner> {
    records
        .into_iter()
        .filter_map(|record| {
            tickets
                .iter()
                .find(|t| t.id == record.ticket_id)
                .cloned()
                .map(|ticket| DrawnWinner { record, ticket })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::testing::{MemoryStore, paid, reserved};
    use crate::entities::TicketStatus;
    use crate::models::UserRole;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn owner() -> Caller {
        Caller::new("owner", UserRole::User)
    }

    /// 号码 1..5：1,2,3 已付款，4 已预订，5 未售出
    fn scenario_store() -> MemoryStore {
        MemoryStore::new(
            "r1",
            "owner",
            5,
            vec![paid(1), paid(2), paid(3), reserved(4)],
        )
    }

    fn opts(count: i64, require_paid: bool) -> DrawOptions {
        DrawOptions::new(count, require_paid).unwrap()
    }

    fn numbers(winners: &[DrawnWinner]) -> HashSet<i32> {
        winners.iter().map(|w| w.ticket.number).collect()
    }

    #[test]
    fn test_draw_options_validation() {
        assert!(DrawOptions::new(1, true).is_ok());
        assert!(matches!(
            DrawOptions::new(0, true),
            Err(DrawError::InvalidInput(_))
        ));
        assert!(matches!(
            DrawOptions::new(-3, false),
            Err(DrawError::InvalidInput(_))
        ));
        assert_eq!(
            DrawOptions::new(5_000_000_000, true).unwrap().winners_count.get(),
            u32::MAX
        );
        assert_eq!(DrawOptions::new(i64::MAX, false).unwrap().winners_count.get(), u32::MAX);
    }

    #[tokio::test]
    async fn test_count_beyond_u32_is_clamped() {
        let store = MemoryStore::new("r1", "owner", 3, vec![paid(1), paid(2), reserved(3)]);
        let engine = DrawEngine::new(&store);

        let winners = engine
            .draw_random("r1", &opts(5_000_000_000, true), &owner())
            .await
            .unwrap();

        assert_eq!(numbers(&winners), HashSet::from([1, 2]));
        assert_eq!(store.winner_count(), 2);
    }

    #[tokio::test]
    async fn test_draw_two_paid_winners() {
        let store = scenario_store();
        let engine = DrawEngine::new(&store);

        let winners = engine.draw_random("r1", &opts(2, true), &owner()).await.unwrap();

        assert_eq!(winners.len(), 2);
        let nums = numbers(&winners);
        assert_eq!(nums.len(), 2);
        assert!(nums.is_subset(&HashSet::from([1, 2, 3])));
        assert!(winners.iter().all(|w| w.ticket.status == TicketStatus::Pagado));
        assert!(winners.iter().all(|w| !w.record.is_manual));
        assert_eq!(store.winner_count(), 2);
    }

    #[tokio::test]
    async fn test_oversized_count_is_clamped() {
        let store = scenario_store();
        let engine = DrawEngine::new(&store);

        let winners = engine.draw_random("r1", &opts(10, true), &owner()).await.unwrap();

        assert_eq!(numbers(&winners), HashSet::from([1, 2, 3]));
    }

    #[tokio::test]
    async fn test_batch_shares_timestamp() {
        let store = scenario_store();
        let engine = DrawEngine::new(&store);

        let winners = engine.draw_random("r1", &opts(3, false), &owner()).await.unwrap();

        let stamps: HashSet<_> = winners.iter().map(|w| w.record.won_at).collect();
        assert_eq!(stamps.len(), 1);
    }

    #[tokio::test]
    async fn test_prior_random_winner_excluded() {
        let store = scenario_store();
        store.add_winner(1, false);
        let engine = DrawEngine::new(&store);

        let winners = engine.draw_random("r1", &opts(5, true), &owner()).await.unwrap();

        assert_eq!(numbers(&winners), HashSet::from([2, 3]));
    }

    #[tokio::test]
    async fn test_repeated_draws_never_reselect() {
        let store = scenario_store();
        let engine = DrawEngine::new(&store);

        let mut seen = HashSet::new();
        for _ in 0..4 {
            let winners = engine.draw_random("r1", &opts(1, false), &owner()).await.unwrap();
            for w in &winners {
                assert!(seen.insert(w.ticket.number), "number drawn twice");
            }
        }
        assert_eq!(seen, HashSet::from([1, 2, 3, 4]));

        let err = engine.draw_random("r1", &opts(1, false), &owner()).await.unwrap_err();
        assert!(matches!(
            err,
            DrawError::NoEligibleTickets {
                require_paid: false
            }
        ));
    }

    #[tokio::test]
    async fn test_no_paid_tickets() {
        let store = MemoryStore::new("r1", "owner", 3, vec![reserved(1), reserved(2)]);
        let engine = DrawEngine::new(&store);

        let err = engine.draw_random("r1", &opts(1, true), &owner()).await.unwrap_err();

        assert!(matches!(
            err,
            DrawError::NoEligibleTickets { require_paid: true }
        ));
        assert_eq!(store.winner_count(), 0);
    }

    #[tokio::test]
    async fn test_no_tickets_at_all() {
        let store = MemoryStore::new("r1", "owner", 3, vec![]);
        let engine = DrawEngine::new(&store);

        let err = engine.draw_random("r1", &opts(1, false), &owner()).await.unwrap_err();

        assert!(matches!(
            err,
            DrawError::NoEligibleTickets {
                require_paid: false
            }
        ));
    }

    #[tokio::test]
    async fn test_forbidden_and_admin() {
        let store = scenario_store();
        let engine = DrawEngine::new(&store);

        let stranger = Caller::new("someone-else", UserRole::User);
        let err = engine.draw_random("r1", &opts(1, false), &stranger).await.unwrap_err();
        assert!(matches!(err, DrawError::Forbidden));
        let err = engine.draw_manual("r1", Some(1), false, &stranger).await.unwrap_err();
        assert!(matches!(err, DrawError::Forbidden));
        assert_eq!(store.winner_count(), 0);

        let admin = Caller::new("platform-admin", UserRole::Admin);
        assert!(engine.draw_random("r1", &opts(1, false), &admin).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_raffle() {
        let store = scenario_store();
        let engine = DrawEngine::new(&store);

        let err = engine.draw_random("nope", &opts(1, false), &owner()).await.unwrap_err();
        assert!(matches!(err, DrawError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_batch_failure_leaves_nothing() {
        let store = scenario_store().fail_on_insert(2);
        let engine = DrawEngine::new(&store);

        let err = engine.draw_random("r1", &opts(3, true), &owner()).await.unwrap_err();

        assert!(matches!(err, DrawError::StoreFailure(_)));
        assert_eq!(store.winner_count(), 0);
    }

    #[tokio::test]
    async fn test_manual_unpaid_rejected_when_paid_only() {
        let store = scenario_store();
        let engine = DrawEngine::new(&store);

        let err = engine.draw_manual("r1", Some(4), true, &owner()).await.unwrap_err();

        assert!(matches!(
            err,
            DrawError::TicketNotPaid {
                number: 4,
                status: TicketStatus::Apartado
            }
        ));
        assert_eq!(store.winner_count(), 0);
    }

    #[tokio::test]
    async fn test_manual_unpaid_allowed_without_filter() {
        let store = scenario_store();
        let engine = DrawEngine::new(&store);

        let winner = engine.draw_manual("r1", Some(4), false, &owner()).await.unwrap();

        assert!(winner.record.is_manual);
        assert_eq!(winner.ticket.number, 4);
        assert_eq!(store.winner_count(), 1);
    }

    #[tokio::test]
    async fn test_manual_input_errors() {
        let store = scenario_store();
        let engine = DrawEngine::new(&store);

        let err = engine.draw_manual("r1", None, false, &owner()).await.unwrap_err();
        assert!(matches!(err, DrawError::InvalidInput(_)));
        let err = engine.draw_manual("r1", Some(0), false, &owner()).await.unwrap_err();
        assert!(matches!(err, DrawError::InvalidInput(_)));

        // 5 号没有任何预订
        let err = engine.draw_manual("r1", Some(5), false, &owner()).await.unwrap_err();
        assert!(matches!(err, DrawError::TicketNotRegistered(5)));

        // 超出 i32 的号码同样视为未登记
        let err = engine
            .draw_manual("r1", Some(3_000_000_000), false, &owner())
            .await
            .unwrap_err();
        assert!(matches!(err, DrawError::TicketNotRegistered(3_000_000_000)));
        assert_eq!(store.winner_count(), 0);
    }

    #[tokio::test]
    async fn test_manual_after_random_win_is_allowed() {
        let store = scenario_store();
        store.add_winner(1, false);
        let engine = DrawEngine::new(&store);

        let winner = engine.draw_manual("r1", Some(1), true, &owner()).await.unwrap();
        assert!(winner.record.is_manual);
        assert_eq!(store.winner_count(), 2);
    }

    #[tokio::test]
    async fn test_manual_win_keeps_ticket_in_random_pool() {
        let store = MemoryStore::new("r1", "owner", 2, vec![paid(1)]);
        store.add_winner(1, true);
        let engine = DrawEngine::new(&store);

        let winners = engine.draw_random("r1", &opts(1, true), &owner()).await.unwrap();
        assert_eq!(numbers(&winners), HashSet::from([1]));
    }

    #[tokio::test]
    async fn test_duplicate_manual_guard() {
        let store = scenario_store();
        store.add_winner(2, true);

        // 默认宽松：允许重复
        let lenient = DrawEngine::new(&store);
        assert!(lenient.draw_manual("r1", Some(2), false, &owner()).await.is_ok());

        let strict = DrawEngine::new(&store).reject_duplicate_manual(true);
        let err = strict.draw_manual("r1", Some(2), false, &owner()).await.unwrap_err();
        assert!(matches!(err, DrawError::AlreadyManualWinner(2)));
        assert_eq!(store.winner_count(), 2);
    }

    #[tokio::test]
    async fn test_stale_snapshot_can_overlap() {
        // 两个请求读取同一快照时，核心不保证跨请求互斥
        let store = MemoryStore::new("r1", "owner", 1, vec![paid(1)]);
        store.freeze_snapshot();
        let first = DrawEngine::new(&store);
        let second = DrawEngine::new(&store);

        let a = first.draw_random("r1", &opts(1, true), &owner()).await.unwrap();
        let b = second.draw_random("r1", &opts(1, true), &owner()).await.unwrap();
        assert_eq!(a[0].ticket.number, b[0].ticket.number);
        assert_eq!(store.winner_count(), 2);

        // 基于一致快照时不会重复
        store.thaw_snapshot();
        let err = first.draw_random("r1", &opts(1, true), &owner()).await.unwrap_err();
        assert!(matches!(err, DrawError::NoEligibleTickets { .. }));
    }

    #[test]
    fn test_sample_is_distinct_and_sized() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool: Vec<Ticket> = (1..=20).map(paid).collect();

        let picked = sample_winners(pool.clone(), 5, &mut rng);
        assert_eq!(picked.len(), 5);
        let ids: HashSet<i64> = picked.iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), 5);

        let all = sample_winners(pool, 50, &mut rng);
        assert_eq!(all.len(), 20);
    }

    #[test]
    fn test_sample_is_uniform() {
        let mut rng = StdRng::seed_from_u64(42);
        let pool: Vec<Ticket> = (1..=5).map(paid).collect();
        let mut hits = [0u32; 5];
        let rounds = 20_000;

        for _ in 0..rounds {
            for t in sample_winners(pool.clone(), 2, &mut rng) {
                hits[(t.number - 1) as usize] += 1;
            }
        }

        // 期望每个号码 2/5 的概率
        let expected = rounds as f64 * 2.0 / 5.0;
        for h in hits {
            let deviation = (h as f64 - expected).abs() / expected;
            assert!(deviation < 0.05, "hits {hits:?} deviate from {expected}");
        }
    }
}
