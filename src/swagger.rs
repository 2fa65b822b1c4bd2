use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::entities::{RaffleStatus, TicketStatus};
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::raffle::draw,
        handlers::raffle::manual_winner,
        handlers::raffle::get_winners,
        handlers::ticket::update_ticket,
        handlers::ticket::delete_ticket,
    ),
    components(
        schemas(
            DrawRequest,
            ManualWinnerRequest,
            DrawResponse,
            WinnerView,
            BuyerView,
            RaffleWinnersResponse,
            UpdateTicketRequest,
            TicketResponse,
            TicketStatus,
            RaffleStatus,
            UserRole,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "raffle", description = "Raffle draw API"),
        (name = "ticket", description = "Ticket management API"),
    ),
    info(
        title = "Rifa Backend API",
        version = "1.0.0",
        description = "Rifa Backend REST API documentation",
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
