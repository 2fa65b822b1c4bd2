use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 号码状态：APARTADO(已预订) -> REVISANDO(审核中) -> PAGADO(已付款)
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    #[sea_orm(string_value = "APARTADO")]
    Apartado,
    #[sea_orm(string_value = "REVISANDO")]
    Revisando,
    #[sea_orm(string_value = "PAGADO")]
    Pagado,
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketStatus::Apartado => write!(f, "APARTADO"),
            TicketStatus::Revisando => write!(f, "REVISANDO"),
            TicketStatus::Pagado => write!(f, "PAGADO"),
        }
    }
}

/// 号码实体
/// 说明:
/// - number 在同一 raffle 内唯一 (1..=total_tickets)，没有记录的号码即为可售
/// - 买家信息均为自由文本，不做身份校验
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tickets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub raffle_id: String,
    pub number: i32,
    pub status: TicketStatus,
    pub buyer_name: Option<String>,
    pub buyer_phone: Option<String>,
    pub buyer_email: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::raffles::Entity",
        from = "Column::RaffleId",
        to = "super::raffles::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Raffle,
    #[sea_orm(has_many = "super::raffle_winners::Entity")]
    Wins,
}

impl Related<super::raffles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Raffle.def()
    }
}

impl Related<super::raffle_winners::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wins.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
