//! 锁仓 / 兑换 API

use std::{str::FromStr, sync::Arc};

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    api::{
        middleware::TraceId,
        response::{success_response, ApiResult},
    },
    app_state::AppState,
    domain::{
        estimate_hiiq, lock_period::DEFAULT_LOCK_DAYS, LockError, LockPeriod, TokenAmount,
    },
    error::AppError,
    service::{
        balance_reader::Balances,
        tx_sequencer::{LockAction, TxOutcome},
    },
};

#[derive(Debug, Serialize, ToSchema)]
pub struct Healthz {
    pub status: String,
    pub version: String,
    pub wallet_status: String,
    pub chain_id: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResp {
    pub status: String,
    pub account: Option<String>,
    pub chain_id: Option<u64>,
    pub expected_chain_id: u64,
    pub network_mismatch: bool,
    /// 当前提交状态：idle / approving / executing / confirmed / failed
    pub submission_status: String,
    pub submission_message: String,
    pub in_flight: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EstimateQuery {
    /// 锁仓数量（十进制字符串）
    pub amount: String,
    /// 锁仓天数，默认 7
    pub days: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EstimateResp {
    pub amount: String,
    pub days: u32,
    pub multiplier: String,
    pub estimated_hiiq: String,
    /// 解锁时间（unix 秒）
    pub unlock_time: u64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LockReq {
    pub amount: String,
    pub days: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AmountReq {
    pub amount: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TxOutcomeResp {
    /// convert / lock / increase_amount
    pub action: String,
    pub amount: String,
    pub lock_days: Option<u32>,
    pub approve_tx_hash: String,
    pub approve_block: Option<u64>,
    pub action_tx_hash: String,
    pub action_block: Option<u64>,
}

impl From<TxOutcome> for TxOutcomeResp {
    fn from(outcome: TxOutcome) -> Self {
        let (action, lock_days) = match outcome.action {
            LockAction::Convert => ("convert", None),
            LockAction::Lock { days } => ("lock", Some(days)),
            LockAction::IncreaseAmount => ("increase_amount", None),
        };
        Self {
            action: action.to_string(),
            amount: outcome.amount,
            lock_days,
            approve_tx_hash: format!("{:?}", outcome.approve_tx.tx_hash),
            approve_block: outcome.approve_tx.block_number,
            action_tx_hash: format!("{:?}", outcome.action_tx.tx_hash),
            action_block: outcome.action_tx.block_number,
        }
    }
}

fn with_trace(trace_id: &TraceId) -> impl Fn(LockError) -> AppError + '_ {
    move |e| AppError::from(e).with_trace_id(trace_id.0.clone())
}

#[utoipa::path(
    get,
    path = "/healthz",
    responses((status = 200, description = "OK", body = Healthz)),
    tag = "System"
)]
pub async fn healthz(State(st): State<Arc<AppState>>) -> ApiResult<Healthz> {
    success_response(Healthz {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        wallet_status: st.session.status().as_str().to_string(),
        chain_id: st.expected_chain_id(),
    })
}

#[utoipa::path(
    get,
    path = "/api/session",
    responses((status = 200, description = "Wallet session", body = SessionResp)),
    tag = "Wallet"
)]
pub async fn get_session(State(st): State<Arc<AppState>>) -> ApiResult<SessionResp> {
    let session = &st.session;
    let expected = st.expected_chain_id();
    let status = st.sequencer.status();
    success_response(SessionResp {
        status: session.status().as_str().to_string(),
        account: session.account().map(|a| format!("{:?}", a)),
        chain_id: session.chain_id(),
        expected_chain_id: expected,
        network_mismatch: session.is_network_mismatch(expected),
        submission_status: status.as_str().to_string(),
        submission_message: status.description().to_string(),
        in_flight: st.sequencer.is_in_flight(),
    })
}

#[utoipa::path(
    get,
    path = "/api/balances",
    responses(
        (status = 200, description = "IQ / hiIQ / pIQ balances", body = Balances),
        (status = 502, description = "Balance unavailable", body = crate::error_body::ErrorBodyDoc)
    ),
    tag = "Wallet"
)]
pub async fn get_balances(
    State(st): State<Arc<AppState>>,
    Extension(trace_id): Extension<TraceId>,
) -> ApiResult<Balances> {
    let balances = st
        .balance_reader
        .get_balances(&st.session)
        .await
        .map_err(with_trace(&trace_id))?;
    success_response(balances)
}

#[utoipa::path(
    get,
    path = "/api/lock/estimate",
    params(EstimateQuery),
    responses(
        (status = 200, description = "hiIQ estimate", body = EstimateResp),
        (status = 400, description = "Invalid amount or lock period", body = crate::error_body::ErrorBodyDoc)
    ),
    tag = "Lock"
)]
pub async fn estimate_lock(
    State(st): State<Arc<AppState>>,
    Extension(trace_id): Extension<TraceId>,
    Query(q): Query<EstimateQuery>,
) -> ApiResult<EstimateResp> {
    let on_err = with_trace(&trace_id);
    let decimals = st.sequencer.deployment().decimals;

    let parsed = TokenAmount::parse(&q.amount, decimals).map_err(|e| on_err(e.into()))?;
    let period =
        LockPeriod::new(q.days.unwrap_or(DEFAULT_LOCK_DAYS)).map_err(&on_err)?;
    let too_large = || on_err(LockError::InvalidAmount("amount is too large".to_string()));
    let amount = Decimal::from_str(&parsed.to_string()).map_err(|_| too_large())?;
    let estimated = estimate_hiiq(amount, period).ok_or_else(too_large)?;

    success_response(EstimateResp {
        amount: parsed.to_string(),
        days: period.days(),
        multiplier: period.multiplier().round_dp(6).normalize().to_string(),
        estimated_hiiq: estimated.normalize().to_string(),
        unlock_time: period.unlock_timestamp(Utc::now()),
    })
}

async fn run_action(
    st: &AppState,
    trace_id: &TraceId,
    amount: &str,
    action: LockAction,
) -> ApiResult<TxOutcomeResp> {
    let outcome = st
        .sequencer
        .submit(&st.session, amount, action)
        .await
        .map_err(with_trace(trace_id))?;
    success_response(outcome.into())
}

#[utoipa::path(
    post,
    path = "/api/lock",
    request_body = LockReq,
    responses(
        (status = 200, description = "Approve and lock confirmed", body = TxOutcomeResp),
        (status = 400, description = "Invalid amount or lock period", body = crate::error_body::ErrorBodyDoc),
        (status = 401, description = "Wallet disconnected", body = crate::error_body::ErrorBodyDoc),
        (status = 409, description = "Network mismatch or submission in flight", body = crate::error_body::ErrorBodyDoc),
        (status = 502, description = "Transaction rejected", body = crate::error_body::ErrorBodyDoc),
        (status = 504, description = "Transaction step timed out", body = crate::error_body::ErrorBodyDoc)
    ),
    tag = "Lock"
)]
pub async fn lock(
    State(st): State<Arc<AppState>>,
    Extension(trace_id): Extension<TraceId>,
    Json(req): Json<LockReq>,
) -> ApiResult<TxOutcomeResp> {
    run_action(&st, &trace_id, &req.amount, LockAction::Lock { days: req.days }).await
}

#[utoipa::path(
    post,
    path = "/api/lock/increase",
    request_body = AmountReq,
    responses(
        (status = 200, description = "Approve and increase_amount confirmed", body = TxOutcomeResp),
        (status = 400, description = "Invalid amount", body = crate::error_body::ErrorBodyDoc),
        (status = 401, description = "Wallet disconnected", body = crate::error_body::ErrorBodyDoc),
        (status = 409, description = "Network mismatch or submission in flight", body = crate::error_body::ErrorBodyDoc),
        (status = 502, description = "Transaction rejected", body = crate::error_body::ErrorBodyDoc),
        (status = 504, description = "Transaction step timed out", body = crate::error_body::ErrorBodyDoc)
    ),
    tag = "Lock"
)]
pub async fn increase_lock(
    State(st): State<Arc<AppState>>,
    Extension(trace_id): Extension<TraceId>,
    Json(req): Json<AmountReq>,
) -> ApiResult<TxOutcomeResp> {
    run_action(&st, &trace_id, &req.amount, LockAction::IncreaseAmount).await
}

#[utoipa::path(
    post,
    path = "/api/convert",
    request_body = AmountReq,
    responses(
        (status = 200, description = "Approve and mint confirmed", body = TxOutcomeResp),
        (status = 400, description = "Invalid amount", body = crate::error_body::ErrorBodyDoc),
        (status = 401, description = "Wallet disconnected", body = crate::error_body::ErrorBodyDoc),
        (status = 409, description = "Network mismatch or submission in flight", body = crate::error_body::ErrorBodyDoc),
        (status = 502, description = "Transaction rejected", body = crate::error_body::ErrorBodyDoc),
        (status = 504, description = "Transaction step timed out", body = crate::error_body::ErrorBodyDoc)
    ),
    tag = "Lock"
)]
pub async fn convert(
    State(st): State<Arc<AppState>>,
    Extension(trace_id): Extension<TraceId>,
    Json(req): Json<AmountReq>,
) -> ApiResult<TxOutcomeResp> {
    run_action(&st, &trace_id, &req.amount, LockAction::Convert).await
}
