use std::{sync::Arc, time::Instant};

use axum::{
    extract::Request,
    http::{header::CACHE_CONTROL, HeaderValue, Method},
    middleware::{from_fn, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::Level;
use utoipa::OpenApi;

use crate::{app_state::AppState, error::AppError};

pub mod lock_api;
pub mod middleware;
pub mod response;

use middleware::{trace_id_middleware, TraceId};

#[derive(OpenApi)]
#[openapi(
    paths(
        lock_api::healthz,
        lock_api::get_session,
        lock_api::get_balances,
        lock_api::estimate_lock,
        lock_api::lock,
        lock_api::increase_lock,
        lock_api::convert
    ),
    components(
        schemas(
            lock_api::Healthz,
            lock_api::SessionResp,
            lock_api::EstimateResp,
            lock_api::LockReq,
            lock_api::AmountReq,
            lock_api::TxOutcomeResp,
            crate::service::balance_reader::Balances,
            crate::error_body::ErrorBodyDoc
        )
    ),
    tags(
        (name = "System", description = "Health and API documentation"),
        (name = "Wallet", description = "Wallet session and token balances"),
        (name = "Lock", description = "IQ locking and pIQ conversion")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn routes(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(lock_api::healthz))
        .route("/api/openapi.json", get(openapi_json))
        .route("/api/session", get(lock_api::get_session))
        .route("/api/balances", get(lock_api::get_balances))
        .route("/api/lock/estimate", get(lock_api::estimate_lock))
        .route("/api/lock", post(lock_api::lock))
        .route("/api/lock/increase", post(lock_api::increase_lock))
        .route("/api/convert", post(lock_api::convert))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(trace_id_middleware))
                .layer(cors)
                .layer(from_fn(no_store))
                .layer(from_fn(trace_log)),
        )
        .with_state(state)
}

async fn not_found(req: Request) -> AppError {
    let trace_id = req.extensions().get::<TraceId>().map(|t| t.0.clone());
    let err = AppError::not_found(format!("No route for {}", req.uri().path()));
    match trace_id {
        Some(trace_id) => err.with_trace_id(trace_id),
        None => err,
    }
}

/// 余额和交易结果不可缓存
async fn no_store(req: Request, next: Next) -> Response {
    let mut resp = next.run(req).await;
    resp.headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    resp
}

async fn trace_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();
    let resp = next.run(req).await;
    let status = resp.status();
    let elapsed = start.elapsed().as_millis();
    tracing::event!(Level::INFO, method=%method, path=%path, status=%status.as_u16(), elapsed_ms=%elapsed, "http_request");
    resp
}
