//! 锁仓周期与 hiIQ 预估

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::lock_error::LockError;

pub const MIN_LOCK_DAYS: u32 = 1;
/// 最长锁仓四年
pub const MAX_LOCK_DAYS: u32 = 1460;
pub const DEFAULT_LOCK_DAYS: u32 = 7;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockPeriod {
    days: u32,
}

impl LockPeriod {
    pub fn new(days: u32) -> Result<Self, LockError> {
        if !(MIN_LOCK_DAYS..=MAX_LOCK_DAYS).contains(&days) {
            return Err(LockError::InvalidLockPeriod(days));
        }
        Ok(Self { days })
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    /// 解锁时间（unix 秒）
    pub fn unlock_timestamp(&self, now: DateTime<Utc>) -> u64 {
        let unlock = now + Duration::seconds(self.days as i64 * SECONDS_PER_DAY);
        unlock.timestamp().max(0) as u64
    }

    /// hiIQ 倍数：1 + 3 * days / 1460，锁满四年为 4 倍
    pub fn multiplier(&self) -> Decimal {
        Decimal::ONE
            + Decimal::from(3u32) * Decimal::from(self.days) / Decimal::from(MAX_LOCK_DAYS)
    }
}

impl Default for LockPeriod {
    fn default() -> Self {
        Self {
            days: DEFAULT_LOCK_DAYS,
        }
    }
}

/// 预估锁仓后获得的 hiIQ 数量，超出 Decimal 表示范围时返回 None
pub fn estimate_hiiq(amount: Decimal, period: LockPeriod) -> Option<Decimal> {
    amount
        .checked_mul(period.multiplier())
        .map(|v| v.round_dp(6))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_period_bounds() {
        assert!(LockPeriod::new(0).is_err());
        assert!(LockPeriod::new(1).is_ok());
        assert!(LockPeriod::new(MAX_LOCK_DAYS).is_ok());
        assert_eq!(
            LockPeriod::new(MAX_LOCK_DAYS + 1),
            Err(LockError::InvalidLockPeriod(MAX_LOCK_DAYS + 1))
        );
        assert_eq!(LockPeriod::default().days(), 7);
    }

    #[test]
    fn test_unlock_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let period = LockPeriod::new(7).unwrap();
        assert_eq!(
            period.unlock_timestamp(now),
            now.timestamp() as u64 + 7 * 86_400
        );
    }

    #[test]
    fn test_estimate_hiiq() {
        let amount = Decimal::from_str("100").unwrap();
        let four_years = LockPeriod::new(MAX_LOCK_DAYS).unwrap();
        assert_eq!(estimate_hiiq(amount, four_years), Some(Decimal::from(400)));

        let two_years = LockPeriod::new(730).unwrap();
        assert_eq!(estimate_hiiq(amount, two_years), Some(Decimal::from(250)));
    }

    #[test]
    fn test_estimate_hiiq_overflow_returns_none() {
        let four_years = LockPeriod::new(MAX_LOCK_DAYS).unwrap();
        let huge = Decimal::from_str("70000000000000000000000000000").unwrap();
        assert_eq!(estimate_hiiq(huge, four_years), None);

        // 一天的倍数略大于 1，同样会溢出
        assert_eq!(estimate_hiiq(Decimal::MAX, LockPeriod::new(1).unwrap()), None);

        let largest_ok = Decimal::from_str("19000000000000000000000000000").unwrap();
        assert!(estimate_hiiq(largest_ok, four_years).is_some());
    }
}
