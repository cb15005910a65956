use serde::Serialize;
use utoipa::ToSchema;

/// 锁仓服务的错误响应体
///
/// 错误码与 HTTP 状态：
/// - `invalid_amount` / `invalid_lock_period`：400，数量无法解析、为零、超出范围，或天数不在 1..=1460
/// - `wallet_disconnected`：401，服务端没有可签名的钱包
/// - `network_mismatch`：409，钱包所在链与部署链不一致
/// - `submission_in_flight`：409，已有一笔 approve → 目标调用在进行中
/// - `approval_rejected`：502，approve 交易被拒绝或回滚
/// - `transaction_rejected`：502，mint / lock / increase_amount 被拒绝或回滚
/// - `balance_unavailable`：502，balanceOf 查询失败
/// - `timeout`：504，某一步（含 gas 估算）超过单步超时
/// - `not_found`：404，未知路由
/// - `internal`：500，未预期的内部错误
#[derive(Serialize, ToSchema)]
pub struct ErrorBodyDoc {
    #[schema(example = "network_mismatch")]
    pub code: String,
    /// 面向用户的提示文本，例如 "Switch your wallet to chain 137 and try again"
    pub message: String,
    /// 与响应头 `X-Trace-Id` 相同，便于在日志中定位请求
    pub trace_id: Option<String>,
}
