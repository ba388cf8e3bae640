//! Compact display formatting for leaderboard figures.
//!
//! Mirrors en-US compact notation: values are scaled to the largest of
//! thousand/million/billion/trillion that fits, rounded half away from zero
//! to at most `digits` fraction digits, and trailing zeros are dropped.
//! Suffixes are always upper case (`K`, `M`, `B`, `T`).

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

pub const REWARD_UNIT: &str = "SOMI";
pub const ANONYMOUS: &str = "Anonymous";

/// (power of ten, suffix)
const TIERS: [(u32, &str); 5] = [(0, ""), (3, "K"), (6, "M"), (9, "B"), (12, "T")];

/// Returns (is_negative, digits-and-suffix) for a finite value.
fn compact_parts(n: f64, digits: u32) -> (bool, String) {
    if n.is_nan() {
        return (false, "NaN".to_string());
    }
    if n.is_infinite() {
        return (n < 0.0, "∞".to_string());
    }
    let negative = n.is_sign_negative() && n != 0.0;

    // Round the shortest decimal form, not the binary value: 1005 / 1000 must
    // be exactly 1.005 so that it rounds to 1.01.
    let abs = match Decimal::from_str(&n.abs().to_string()) {
        Ok(d) => d,
        Err(_) => return (negative, format!("{:.0}T", n.abs() / 1e12)),
    };

    let mut tier = TIERS
        .iter()
        .rposition(|(exp, _)| abs >= tier_divisor(*exp))
        .unwrap_or(0);
    let mut rounded = round_half_away(abs / tier_divisor(TIERS[tier].0), digits);
    // 999_999 with one digit rounds to 1000.0K, which reads as 1M.
    while rounded >= Decimal::from(1000) && tier + 1 < TIERS.len() {
        tier += 1;
        rounded = round_half_away(abs / tier_divisor(TIERS[tier].0), digits);
    }

    (negative, format!("{}{}", rounded.normalize(), TIERS[tier].1))
}

fn tier_divisor(exp: u32) -> Decimal {
    Decimal::from(10u64.pow(exp))
}

fn round_half_away(x: Decimal, digits: u32) -> Decimal {
    x.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero)
}

/// USD in compact notation, e.g. `$1.23K`, `-$4.5M`.
pub fn compact_currency(n: f64, digits: u32) -> String {
    let (negative, body) = compact_parts(n, digits);
    if negative {
        format!("-${}", body)
    } else {
        format!("${}", body)
    }
}

/// Plain compact notation, e.g. `2.5M`.
pub fn compact_number(n: f64, digits: u32) -> String {
    let (negative, body) = compact_parts(n, digits);
    if negative {
        format!("-{}", body)
    } else {
        body
    }
}

pub fn format_total_volume(usd: f64) -> String {
    compact_currency(usd, 1)
}

pub fn format_row_volume(usd: f64) -> String {
    compact_currency(usd, 2)
}

pub fn format_reward(somi: f64) -> String {
    format!("{} {}", compact_number(somi, 1), REWARD_UNIT)
}

pub fn display_name(name: Option<&str>) -> String {
    name.unwrap_or(ANONYMOUS).to_string()
}
