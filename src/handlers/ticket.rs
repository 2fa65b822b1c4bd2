use crate::error::AppError;
use crate::handlers::get_caller_from_request;
use crate::models::*;
use crate::services::RaffleService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    patch,
    path = "/raffles/tickets/{ticket_id}",
    tag = "ticket",
    params(
        ("ticket_id" = i64, Path, description = "号码记录ID")
    ),
    request_body = UpdateTicketRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新成功", body = TicketResponse),
        (status = 400, description = "请求参数错误"),
        (status = 401, description = "未授权"),
        (status = 403, description = "不是抽奖创建者"),
        (status = 404, description = "号码不存在")
    )
)]
/// 更新号码状态（APARTADO / REVISANDO / PAGADO）或买家电话
pub async fn update_ticket(
    service: web::Data<RaffleService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateTicketRequest>,
) -> Result<HttpResponse> {
    let Some(caller) = get_caller_from_request(&req) else {
        return Ok(AppError::AuthError("Missing access token".into()).error_response());
    };

    match service
        .update_ticket(path.into_inner(), request.into_inner(), &caller)
        .await
    {
        Ok(ticket) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": ticket }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/raffles/tickets/{ticket_id}",
    tag = "ticket",
    params(
        ("ticket_id" = i64, Path, description = "号码记录ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功，同时删除该号码的中奖记录"),
        (status = 401, description = "未授权"),
        (status = 403, description = "不是抽奖创建者"),
        (status = 404, description = "号码不存在")
    )
)]
/// 删除号码（释放预订）
pub async fn delete_ticket(
    service: web::Data<RaffleService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let Some(caller) = get_caller_from_request(&req) else {
        return Ok(AppError::AuthError("Missing access token".into()).error_response());
    };

    match service.delete_ticket(path.into_inner(), &caller).await {
        Ok(removed) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "removedWinners": removed },
            "message": "Ticket deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}
