use sea_orm::DbErr;
use thiserror::Error;

use crate::entities::TicketStatus;

pub type DrawResult<T> = Result<T, DrawError>;

/// 抽奖核心的错误类型，不涉及 HTTP 状态码（由 AppError 负责映射）
#[derive(Error, Debug)]
pub enum DrawError {
    #[error("{0}")]
    NotFound(String),

    #[error("You do not have permission to manage this raffle")]
    Forbidden,

    #[error("{0}")]
    InvalidInput(String),

    #[error("Number {0} has no registered ticket in this raffle")]
    TicketNotRegistered(i64),

    #[error(
        "Cannot add number {number}: its status is {status}. To add it, turn off \"only paid numbers\" or mark the ticket as paid first"
    )]
    TicketNotPaid { number: i32, status: TicketStatus },

    #[error("{}", no_eligible_message(.require_paid))]
    NoEligibleTickets { require_paid: bool },

    #[error("Number {0} has already been registered as a manual winner")]
    AlreadyManualWinner(i32),

    #[error("Store failure: {0}")]
    StoreFailure(#[from] DbErr),
}

fn no_eligible_message(require_paid: &bool) -> &'static str {
    if *require_paid {
        "No tickets with status PAGADO were found to take part in the draw"
    } else {
        "No registered tickets were found that can take part in the draw"
    }
}
