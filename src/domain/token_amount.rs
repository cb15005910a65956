//! 代币数量换算
//!
//! 十进制字符串与链上最小单位（U256）之间的转换，规则与 ethers.js
//! `parseUnits` / `formatUnits` 保持一致。

use std::fmt;

use ethers::types::U256;
use thiserror::Error;

/// ERC20 默认精度
pub const DEFAULT_DECIMALS: u32 = 18;

/// U256 能表示的最大 10 的幂次
const MAX_DECIMALS: u32 = 77;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("amount must not be negative")]
    Negative,

    #[error("amount is not a decimal number: {0}")]
    Malformed(String),

    #[error("amount has more than {max} fractional digits")]
    TooManyDecimals { max: u32 },

    #[error("amount does not fit into 256 bits")]
    Overflow,
}

/// 将十进制字符串转换为最小单位
pub fn parse_units(input: &str, decimals: u32) -> Result<U256, AmountError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountError::Overflow);
    }

    let s = input.trim();
    if s.is_empty() {
        return Err(AmountError::Empty);
    }
    if s.starts_with('-') {
        return Err(AmountError::Negative);
    }

    let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(AmountError::Malformed(s.to_string()));
    }
    // 第二个小数点、符号、指数都会在这里被拒绝
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(frac) {
        return Err(AmountError::Malformed(s.to_string()));
    }

    // 超出精度的尾随零不影响数值
    let frac = frac.trim_end_matches('0');
    if frac.len() > decimals as usize {
        return Err(AmountError::TooManyDecimals { max: decimals });
    }

    let whole = if whole.is_empty() { "0" } else { whole };
    let whole = U256::from_dec_str(whole).map_err(|_| AmountError::Overflow)?;

    let frac = if frac.is_empty() {
        U256::zero()
    } else {
        let padded = format!("{:0<width$}", frac, width = decimals as usize);
        U256::from_dec_str(&padded).map_err(|_| AmountError::Overflow)?
    };

    whole
        .checked_mul(U256::exp10(decimals as usize))
        .and_then(|v| v.checked_add(frac))
        .ok_or(AmountError::Overflow)
}

/// 将最小单位格式化为十进制字符串（至少保留一位小数）
pub fn format_units(value: U256, decimals: u32) -> String {
    if decimals == 0 {
        return value.to_string();
    }
    let decimals = decimals.min(MAX_DECIMALS);

    let scale = U256::exp10(decimals as usize);
    let whole = value / scale;
    let frac = value % scale;

    let frac = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
    let frac = frac.trim_end_matches('0');
    let frac = if frac.is_empty() { "0" } else { frac };

    format!("{}.{}", whole, frac)
}

/// 已解析的代币数量
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAmount {
    raw: U256,
    decimals: u32,
}

impl TokenAmount {
    pub fn parse(input: &str, decimals: u32) -> Result<Self, AmountError> {
        Ok(Self {
            raw: parse_units(input, decimals)?,
            decimals,
        })
    }

    pub fn from_raw(raw: U256, decimals: u32) -> Self {
        Self { raw, decimals }
    }

    pub fn raw(&self) -> U256 {
        self.raw
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_units(self.raw, self.decimals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_one_and_a_half_ether() {
        let v = parse_units("1.5", 18).unwrap();
        assert_eq!(v, U256::from_dec_str("1500000000000000000").unwrap());
    }

    #[test]
    fn test_parse_accepts_bare_dot_forms() {
        assert_eq!(parse_units(".5", 1).unwrap(), U256::from(5));
        assert_eq!(parse_units("2.", 2).unwrap(), U256::from(200));
        assert_eq!(parse_units(" 3 ", 0).unwrap(), U256::from(3));
        assert_eq!(parse_units("0", 18).unwrap(), U256::zero());
    }

    #[test]
    fn test_parse_ignores_trailing_zeros_beyond_precision() {
        assert_eq!(parse_units("1.5000", 2).unwrap(), U256::from(150));
        assert_eq!(
            parse_units("1.51", 1),
            Err(AmountError::TooManyDecimals { max: 1 })
        );
    }

    #[test]
    fn test_parse_rejects_invalid_input() {
        assert_eq!(parse_units("", 18), Err(AmountError::Empty));
        assert_eq!(parse_units("   ", 18), Err(AmountError::Empty));
        assert_eq!(parse_units("-1", 18), Err(AmountError::Negative));
        for bad in [".", "+1", "1e18", "1.2.3", "abc", "1,5", "0x10"] {
            assert!(
                matches!(parse_units(bad, 18), Err(AmountError::Malformed(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_overflow() {
        let huge = "9".repeat(80);
        assert_eq!(parse_units(&huge, 18), Err(AmountError::Overflow));
        assert_eq!(parse_units("1", 78), Err(AmountError::Overflow));
    }

    #[test]
    fn test_format_matches_ethers_style() {
        let v = U256::from_dec_str("1500000000000000000").unwrap();
        assert_eq!(format_units(v, 18), "1.5");
        assert_eq!(format_units(U256::zero(), 18), "0.0");
        assert_eq!(format_units(U256::exp10(18), 18), "1.0");
        assert_eq!(format_units(U256::from(1), 18), "0.000000000000000001");
        assert_eq!(format_units(U256::from(42), 0), "42");
    }

    #[test]
    fn test_format_then_parse_is_identity() {
        let samples = [
            U256::zero(),
            U256::from(1),
            U256::from(123_456_789u64),
            U256::from_dec_str("1500000000000000000").unwrap(),
            U256::from_dec_str("98765432109876543210123").unwrap(),
        ];
        for decimals in [0u32, 6, 18] {
            for v in samples {
                let s = format_units(v, decimals);
                assert_eq!(parse_units(&s, decimals).unwrap(), v, "{s} @ {decimals}");
            }
        }
    }

    #[test]
    fn test_token_amount_display() {
        let amount = TokenAmount::parse("0.25", 18).unwrap();
        assert!(!amount.is_zero());
        assert_eq!(amount.to_string(), "0.25");
        assert!(TokenAmount::parse("0.0", 18).unwrap().is_zero());
    }
}
