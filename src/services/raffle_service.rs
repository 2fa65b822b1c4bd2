use crate::config::DrawConfig;
use crate::database::SeaOrmDrawStore;
use crate::draw::{DrawEngine, DrawError, DrawOptions, format_drawn, format_history};
use crate::entities::{raffle_entity as raffles, raffle_winner_entity as winners, ticket_entity as tickets};
use crate::error::{AppError, AppResult};
use crate::models::{
    Caller, DrawResponse, RaffleWinnersResponse, TicketResponse, UpdateTicketRequest,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, ModelTrait, QueryFilter, Set, TransactionTrait,
};

#[derive(Clone)]
pub struct RaffleService {
    pool: DatabaseConnection,
    draw_config: DrawConfig,
}

impl RaffleService {
    pub fn new(pool: DatabaseConnection, draw_config: DrawConfig) -> Self {
        Self { pool, draw_config }
    }

    /// 随机抽奖
    ///
    /// 读取快照、写入中奖记录、计算名次在同一个事务内完成
    pub async fn draw_winners(
        &self,
        raffle_id: &str,
        options: DrawOptions,
        caller: &Caller,
    ) -> AppResult<DrawResponse> {
        let txn = self.pool.begin().await?;

        let winners = {
            let engine = DrawEngine::new(SeaOrmDrawStore::new(&txn));
            let drawn = engine.draw_random(raffle_id, &options, caller).await?;
            let history = engine.store().list_winner_history(raffle_id).await?;
            format_drawn(&drawn, &history)
        };

        txn.commit().await?;
        Ok(DrawResponse { winners })
    }

    /// 手动指定中奖号码
    pub async fn manual_winner(
        &self,
        raffle_id: &str,
        ticket_number: Option<i64>,
        require_paid: bool,
        caller: &Caller,
    ) -> AppResult<DrawResponse> {
        let txn = self.pool.begin().await?;

        let winners = {
            let engine = DrawEngine::new(SeaOrmDrawStore::new(&txn))
                .reject_duplicate_manual(self.draw_config.reject_duplicate_manual);
            let drawn = engine
                .draw_manual(raffle_id, ticket_number, require_paid, caller)
                .await?;
            let history = engine.store().list_winner_history(raffle_id).await?;
            format_drawn(std::slice::from_ref(&drawn), &history)
        };

        txn.commit().await?;
        Ok(DrawResponse { winners })
    }

    /// 公开的中奖历史（从新到旧）
    pub async fn list_winners(&self, raffle_id: &str) -> AppResult<RaffleWinnersResponse> {
        let store = SeaOrmDrawStore::new(&self.pool);
        let raffle = store
            .find_raffle(raffle_id)
            .await?
            .ok_or_else(|| DrawError::NotFound("Raffle not found".into()))?;
        let history = store.list_winner_history(raffle_id).await?;

        Ok(RaffleWinnersResponse {
            raffle_id: raffle.id,
            title: raffle.title,
            total_tickets: raffle.total_tickets,
            winners: format_history(&history),
        })
    }

    /// 更新号码状态 / 买家电话（创建者或管理员）
    pub async fn update_ticket(
        &self,
        ticket_id: i64,
        req: UpdateTicketRequest,
        caller: &Caller,
    ) -> AppResult<TicketResponse> {
        if req.status.is_none() && req.buyer_phone.is_none() {
            return Err(AppError::ValidationError("Nothing to update".into()));
        }

        let ticket = Self::find_managed_ticket(&self.pool, ticket_id, caller).await?;

        let mut active = ticket.into_active_model();
        if let Some(status) = req.status {
            active.status = Set(status);
        }
        if let Some(phone) = req.buyer_phone {
            let phone = phone.trim();
            active.buyer_phone = Set((!phone.is_empty()).then(|| phone.to_string()));
        }

        let updated = active.update(&self.pool).await?;
        log::info!(
            "Ticket {ticket_id} updated by {} (status {})",
            caller.user_id,
            updated.status
        );
        Ok(updated.into())
    }

    /// 删除号码，并在同一事务中删除其中奖记录
    ///
    /// 返回被删除的中奖记录数
    pub async fn delete_ticket(&self, ticket_id: i64, caller: &Caller) -> AppResult<u64> {
        let txn = self.pool.begin().await?;

        let ticket = Self::find_managed_ticket(&txn, ticket_id, caller).await?;

        let removed = winners::Entity::delete_many()
            .filter(winners::Column::TicketId.eq(ticket.id))
            .exec(&txn)
            .await?
            .rows_affected;
        ticket.delete(&txn).await?;

        txn.commit().await?;
        log::info!(
            "Ticket {ticket_id} deleted by {} ({removed} winner record(s) removed)",
            caller.user_id
        );
        Ok(removed)
    }

    async fn find_managed_ticket<C: ConnectionTrait>(
        conn: &C,
        ticket_id: i64,
        caller: &Caller,
    ) -> AppResult<tickets::Model> {
        let (ticket, raffle) = tickets::Entity::find_by_id(ticket_id)
            .find_also_related(raffles::Entity)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Ticket not found".into()))?;
        let raffle = raffle.ok_or_else(|| AppError::NotFound("Raffle not found".into()))?;

        if !caller.can_manage(&raffle.creator_id) {
            log::warn!(
                "User {} tried to modify ticket {ticket_id} without permission",
                caller.user_id
            );
            return Err(AppError::PermissionDenied);
        }
        Ok(ticket)
    }
}
