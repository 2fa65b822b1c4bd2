use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::draw::{DrawError, DrawOptions};
use crate::entities::{TicketStatus, ticket_entity};

/// 前端可能传 `true` 或 `"true"`
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(untagged)]
pub enum FlexibleBool {
    Bool(bool),
    Text(String),
}

impl FlexibleBool {
    /// 只有 `true` / `"true"` 视为真，其它一律为假
    pub fn is_true(&self) -> bool {
        match self {
            FlexibleBool::Bool(b) => *b,
            FlexibleBool::Text(s) => s == "true",
        }
    }
}

/// 数字或数字字符串
///
/// 超出 i64 的整数按 i64 上下限饱和
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(untagged)]
pub enum FlexibleInt {
    Int(i64),
    // 超出 i64 的 JSON 整数由 serde_json 解析为浮点
    Float(f64),
    Text(String),
}

impl FlexibleInt {
    pub fn value(&self) -> Option<i64> {
        match self {
            FlexibleInt::Int(n) => Some(*n),
            // `as` 对浮点转整数是饱和转换
            FlexibleInt::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            FlexibleInt::Float(_) => None,
            FlexibleInt::Text(s) => s
                .trim()
                .parse::<i128>()
                .ok()
                .map(|n| n.clamp(i64::MIN.into(), i64::MAX.into()) as i64),
        }
    }
}

/// 随机抽奖请求
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DrawRequest {
    /// 中奖人数 (默认 1，超过可参与数量时自动截断)
    #[serde(default, alias = "winners_count")]
    #[schema(value_type = Option<i64>, example = 3)]
    pub winners_count: Option<FlexibleInt>,
    /// 仅已付款号码参与
    #[serde(default, alias = "only_paid")]
    #[schema(value_type = Option<bool>, example = true)]
    pub only_paid: Option<FlexibleBool>,
}

impl DrawRequest {
    pub fn require_paid(&self) -> bool {
        self.only_paid.as_ref().is_some_and(FlexibleBool::is_true)
    }

    /// 在边界处一次性完成类型转换与校验
    pub fn into_options(self) -> Result<DrawOptions, DrawError> {
        let count = match &self.winners_count {
            None => 1,
            Some(raw) => raw.value().ok_or_else(|| {
                DrawError::InvalidInput("Winners count must be a whole number".into())
            })?,
        };
        DrawOptions::new(count, self.require_paid())
    }
}

/// 手动指定中奖号码请求
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualWinnerRequest {
    #[serde(default, alias = "ticket_number")]
    #[schema(value_type = Option<i32>, example = 7)]
    pub ticket_number: Option<FlexibleInt>,
    #[serde(default, alias = "only_paid")]
    #[schema(value_type = Option<bool>, example = true)]
    pub only_paid: Option<FlexibleBool>,
}

impl ManualWinnerRequest {
    pub fn require_paid(&self) -> bool {
        self.only_paid.as_ref().is_some_and(FlexibleBool::is_true)
    }

    /// 缺失、空串、0 都视为未填写；非数字直接报错
    ///
    /// 超出号码范围的数字原样返回，由抽奖核心报告为未登记
    pub fn ticket_number(&self) -> Result<Option<i64>, DrawError> {
        let Some(raw) = &self.ticket_number else {
            return Ok(None);
        };
        if let FlexibleInt::Text(s) = raw
            && s.trim().is_empty()
        {
            return Ok(None);
        }
        let n = raw
            .value()
            .ok_or_else(|| DrawError::InvalidInput("Ticket number must be a whole number".into()))?;
        Ok(Some(n))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BuyerView {
    pub name: String,
    pub phone: String,
}

/// 中奖者展示结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WinnerView {
    /// 中奖记录ID
    pub winner_id: i64,
    /// 号码 (票已删除时为空)
    pub ticket_number: Option<i32>,
    pub is_manual_winner: bool,
    pub won_at: DateTime<Utc>,
    /// 名次：同类(随机/手动)中最早的为 1
    pub position: u32,
    /// 随机抽奖轮次 (同一次抽奖共享)，手动中奖为空
    pub round: Option<u32>,
    pub ticket_deleted: bool,
    pub buyer: BuyerView,
}

/// 抽奖 / 手动指定后的响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DrawResponse {
    pub winners: Vec<WinnerView>,
}

/// 抽奖中奖历史
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RaffleWinnersResponse {
    pub raffle_id: String,
    pub title: String,
    pub total_tickets: i32,
    pub winners: Vec<WinnerView>,
}

/// 更新号码状态 / 买家电话
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketRequest {
    pub status: Option<TicketStatus>,
    #[serde(alias = "buyer_phone")]
    pub buyer_phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub id: i64,
    pub raffle_id: String,
    pub number: i32,
    pub status: TicketStatus,
    pub buyer_name: Option<String>,
    pub buyer_phone: Option<String>,
    pub buyer_email: Option<String>,
}

impl From<ticket_entity::Model> for TicketResponse {
    fn from(m: ticket_entity::Model) -> Self {
        TicketResponse {
            id: m.id,
            raffle_id: m.raffle_id,
            number: m.number,
            status: m.status,
            buyer_name: m.buyer_name,
            buyer_phone: m.buyer_phone,
            buyer_email: m.buyer_email,
        }
    }
}
