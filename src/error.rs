use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::LockError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppErrorCode {
    // HTTP 基础错误码
    NotFound,
    Internal,

    // 业务错误码
    WalletDisconnected,
    InvalidAmount,
    InvalidLockPeriod,
    NetworkMismatch,
    ApprovalRejected,
    TransactionRejected,
    SubmissionInFlight,
    Timeout,
    BalanceUnavailable,
}

impl AppErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppErrorCode::NotFound => "not_found",
            AppErrorCode::Internal => "internal",

            AppErrorCode::WalletDisconnected => "wallet_disconnected",
            AppErrorCode::InvalidAmount => "invalid_amount",
            AppErrorCode::InvalidLockPeriod => "invalid_lock_period",
            AppErrorCode::NetworkMismatch => "network_mismatch",
            AppErrorCode::ApprovalRejected => "approval_rejected",
            AppErrorCode::TransactionRejected => "transaction_rejected",
            AppErrorCode::SubmissionInFlight => "submission_in_flight",
            AppErrorCode::Timeout => "timeout",
            AppErrorCode::BalanceUnavailable => "balance_unavailable",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppError {
    pub code: AppErrorCode,
    pub message: String,
    pub status: StatusCode,
    pub trace_id: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
    trace_id: Option<&'a str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code.as_str(),
            message: &self.message,
            trace_id: self.trace_id.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            code: AppErrorCode::NotFound,
            message: msg.into(),
            status: StatusCode::NOT_FOUND,
            trace_id: None,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            code: AppErrorCode::Internal,
            message: msg.into(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
            trace_id: None,
        }
    }

    /// 设置追踪ID
    pub fn with_trace_id(mut self, trace_id: String) -> Self {
        self.trace_id = Some(trace_id);
        self
    }
}

impl From<LockError> for AppError {
    fn from(err: LockError) -> Self {
        let (code, status) = match &err {
            LockError::WalletDisconnected => {
                (AppErrorCode::WalletDisconnected, StatusCode::UNAUTHORIZED)
            }
            LockError::InvalidAmount(_) => (AppErrorCode::InvalidAmount, StatusCode::BAD_REQUEST),
            LockError::InvalidLockPeriod(_) => {
                (AppErrorCode::InvalidLockPeriod, StatusCode::BAD_REQUEST)
            }
            LockError::NetworkMismatch { .. } => {
                (AppErrorCode::NetworkMismatch, StatusCode::CONFLICT)
            }
            LockError::ApprovalRejected(_) => {
                (AppErrorCode::ApprovalRejected, StatusCode::BAD_GATEWAY)
            }
            LockError::TransactionRejected { .. } => {
                (AppErrorCode::TransactionRejected, StatusCode::BAD_GATEWAY)
            }
            LockError::SubmissionInFlight => {
                (AppErrorCode::SubmissionInFlight, StatusCode::CONFLICT)
            }
            LockError::Timeout { .. } => (AppErrorCode::Timeout, StatusCode::GATEWAY_TIMEOUT),
            LockError::BalanceUnavailable(_) => {
                (AppErrorCode::BalanceUnavailable, StatusCode::BAD_GATEWAY)
            }
        };

        Self {
            code,
            message: err.user_message(),
            status,
            trace_id: None,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!(error = ?err, "Unhandled internal error");
        AppError::internal("Internal server error")
    }
}
