use crate::error::AppError;
use crate::handlers::get_caller_from_request;
use crate::models::*;
use crate::services::RaffleService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/raffles/{raffle_id}/draw",
    tag = "raffle",
    params(
        ("raffle_id" = String, Path, description = "抽奖ID")
    ),
    request_body = DrawRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "抽奖成功", body = DrawResponse),
        (status = 400, description = "参数错误或没有可参与的号码"),
        (status = 401, description = "未授权"),
        (status = 403, description = "不是抽奖创建者"),
        (status = 404, description = "抽奖不存在")
    )
)]
/// 随机抽取中奖号码
///
/// 已随机中奖的号码不再参与；人数超过可参与数量时只抽取全部可参与号码
pub async fn draw(
    service: web::Data<RaffleService>,
    req: HttpRequest,
    path: web::Path<String>,
    request: web::Json<DrawRequest>,
) -> Result<HttpResponse> {
    let Some(caller) = get_caller_from_request(&req) else {
        return Ok(AppError::AuthError("Missing access token".into()).error_response());
    };
    let raffle_id = path.into_inner();

    let options = match request.into_inner().into_options() {
        Ok(options) => options,
        Err(e) => return Ok(AppError::from(e).error_response()),
    };

    match service.draw_winners(&raffle_id, options, &caller).await {
        Ok(data) => {
            let message = format!("{} winner(s) drawn", data.winners.len());
            Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(data, message)))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/raffles/{raffle_id}/manual-winner",
    tag = "raffle",
    params(
        ("raffle_id" = String, Path, description = "抽奖ID")
    ),
    request_body = ManualWinnerRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "手动指定成功", body = DrawResponse),
        (status = 400, description = "号码为空或未付款"),
        (status = 401, description = "未授权"),
        (status = 403, description = "不是抽奖创建者"),
        (status = 404, description = "抽奖不存在或号码未登记"),
        (status = 409, description = "号码已是手动中奖者")
    )
)]
/// 手动指定中奖号码
pub async fn manual_winner(
    service: web::Data<RaffleService>,
    req: HttpRequest,
    path: web::Path<String>,
    request: web::Json<ManualWinnerRequest>,
) -> Result<HttpResponse> {
    let Some(caller) = get_caller_from_request(&req) else {
        return Ok(AppError::AuthError("Missing access token".into()).error_response());
    };
    let raffle_id = path.into_inner();
    let request = request.into_inner();

    let ticket_number = match request.ticket_number() {
        Ok(n) => n,
        Err(e) => return Ok(AppError::from(e).error_response()),
    };

    match service
        .manual_winner(&raffle_id, ticket_number, request.require_paid(), &caller)
        .await
    {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            data,
            "Manual winner registered".to_string(),
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/raffles/{raffle_id}/winners",
    tag = "raffle",
    params(
        ("raffle_id" = String, Path, description = "抽奖ID")
    ),
    responses(
        (status = 200, description = "获取中奖历史成功", body = RaffleWinnersResponse),
        (status = 404, description = "抽奖不存在")
    )
)]
/// 公开的中奖历史（无需登录）
pub async fn get_winners(
    service: web::Data<RaffleService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match service.list_winners(&path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn raffle_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/raffles")
            .route("/tickets/{ticket_id}", web::patch().to(super::ticket::update_ticket))
            .route("/tickets/{ticket_id}", web::delete().to(super::ticket::delete_ticket))
            .route("/{raffle_id}/draw", web::post().to(draw))
            .route("/{raffle_id}/manual-winner", web::post().to(manual_winner))
            .route("/{raffle_id}/winners", web::get().to(get_winners)),
    );
}
