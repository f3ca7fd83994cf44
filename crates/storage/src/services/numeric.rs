//! Lenient number handling for hand-typed scores, penalties and times.
//!
//! Nothing here fails: text that does not read as a number becomes zero (or
//! `None` where absence is meaningful).

use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{Number, Value};

const MS_PER_MINUTE: i64 = 60_000;
const MS_PER_SECOND: i64 = 1_000;
const MS_PER_CENTISECOND: i64 = 10;

/// Largest magnitude a typed number keeps. Larger input is clamped.
pub const MAX_MAGNITUDE: i64 = 1_000_000_000_000;
/// Decimal places a typed number keeps. Together with [`MAX_MAGNITUDE`] this
/// stays within the digits a stored float reproduces exactly.
pub const MAX_FRACTION_DIGITS: u32 = 3;

/// Reads a score typed by hand: `"12,5"`, `" 7 "`, `"3pts"`. Unreadable text is zero.
pub fn parse_score(input: &str) -> Decimal {
    parse_optional(input).unwrap_or(Decimal::ZERO)
}

/// Like [`parse_score`] but distinguishes "nothing usable" from zero.
pub fn parse_optional(input: &str) -> Option<Decimal> {
    let normalized = input.trim().replacen(',', ".", 1);
    let prefix = numeric_prefix(&normalized);
    if prefix.is_empty() {
        return None;
    }

    Decimal::from_str(prefix)
        .or_else(|_| Decimal::from_scientific(prefix))
        .ok()
        .or_else(|| {
            prefix
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| v.clamp(-(MAX_MAGNITUDE as f64), MAX_MAGNITUDE as f64))
                .and_then(Decimal::from_f64)
        })
        .map(bounded)
}

/// A time penalty typed in seconds, returned in milliseconds.
pub fn parse_penalty_seconds(input: &str) -> Decimal {
    parse_score(input)
        .checked_mul(Decimal::from(MS_PER_SECOND))
        .map(bounded)
        .unwrap_or(Decimal::ZERO)
}

/// Clamps to `±MAX_MAGNITUDE` and rounds to `MAX_FRACTION_DIGITS` places.
pub fn bounded(value: Decimal) -> Decimal {
    let limit = Decimal::from(MAX_MAGNITUDE);
    value
        .clamp(-limit, limit)
        .round_dp_with_strategy(MAX_FRACTION_DIGITS, RoundingStrategy::MidpointAwayFromZero)
}

/// Longest leading slice that reads as a decimal number, optionally signed and
/// with an exponent. Mirrors how a lenient float parser stops at the first
/// character it cannot use.
fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return "";
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    &s[..end]
}

pub fn value_to_decimal(value: &Value) -> Decimal {
    value_to_optional_decimal(value).unwrap_or(Decimal::ZERO)
}

pub fn value_to_optional_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_optional(&n.to_string()),
        Value::String(s) => parse_optional(s),
        _ => None,
    }
}

/// Integral values are written as JSON integers, everything else as floats.
/// The float is read back from the decimal text so it is the nearest one.
pub fn decimal_to_value(decimal: Decimal) -> Value {
    let decimal = decimal.normalize();
    if decimal.scale() == 0
        && let Some(integer) = decimal.to_i64()
    {
        return Value::from(integer);
    }

    decimal
        .to_string()
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Race totals are compared and displayed at two decimals.
pub fn round_points(points: Decimal) -> Decimal {
    points.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats milliseconds as `m:ss.cc`, truncating to the centisecond.
pub fn format_time(ms: Decimal) -> String {
    let sign = if ms.is_sign_negative() && !ms.is_zero() {
        "-"
    } else {
        ""
    };
    let ms = ms.abs();

    let minutes = (ms / Decimal::from(MS_PER_MINUTE)).floor();
    let seconds = ((ms % Decimal::from(MS_PER_MINUTE)) / Decimal::from(MS_PER_SECOND)).floor();
    let centis = ((ms % Decimal::from(MS_PER_SECOND)) / Decimal::from(MS_PER_CENTISECOND)).floor();

    format!(
        "{}{}:{:02}.{:02}",
        sign,
        minutes.to_u64().unwrap_or(0),
        seconds.to_u64().unwrap_or(0),
        centis.to_u64().unwrap_or(0)
    )
}

/// Reads a stopwatch value given either as raw milliseconds (`"20000"`) or
/// as `m:ss.cc` (`"1:05.30"`).
pub fn parse_time(input: &str) -> Option<Decimal> {
    let input = input.trim();

    let ms = match input.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u64 = minutes.trim().parse().ok()?;
            let seconds = Decimal::from_str(&seconds.trim().replacen(',', ".", 1)).ok()?;
            if seconds >= Decimal::from(60) {
                return None;
            }
            Decimal::from(minutes) * Decimal::from(MS_PER_MINUTE)
                + seconds * Decimal::from(MS_PER_SECOND)
        }
        None => Decimal::from_str(input).ok()?,
    };

    (!ms.is_sign_negative()).then(|| bounded(ms))
}
