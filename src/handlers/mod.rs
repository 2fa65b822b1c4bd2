pub mod raffle;
pub mod ticket;

pub use raffle::raffle_config;

use crate::models::Caller;
use actix_web::{HttpMessage, HttpRequest};

/// 从请求扩展中获取当前用户（中间件在鉴权后注入）
pub(crate) fn get_caller_from_request(req: &HttpRequest) -> Option<Caller> {
    req.extensions().get::<Caller>().cloned()
}
