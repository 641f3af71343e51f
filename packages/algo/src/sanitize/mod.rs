//! Data Sanitization
//!
//! Recovery for out-of-invariant memory state coming from storage.
//!
//! The scheduler never rejects input. Records corrupted by external writers are
//! pulled back into range here instead:
//! - ease factor: non-finite → default, below the floor → floor
//! - interval: negative → 0, above the cap → cap
//! - counters: negative → 0, saturating at `u32::MAX`

use crate::types::{DEFAULT_EASE_FACTOR, MAX_INTERVAL_DAYS, MIN_EASE_FACTOR};

/// 清理难度系数
pub fn sanitize_ease_factor(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.max(MIN_EASE_FACTOR),
        _ => DEFAULT_EASE_FACTOR,
    }
}

/// 清理间隔天数，限制在 [0, MAX_INTERVAL_DAYS]
pub fn sanitize_interval(value: Option<i64>) -> u32 {
    value
        .unwrap_or(0)
        .clamp(0, i64::from(MAX_INTERVAL_DAYS)) as u32
}

/// 清理计数器 (repetitions / reviewCount)
pub fn sanitize_count(value: Option<i64>) -> u32 {
    value.unwrap_or(0).clamp(0, i64::from(u32::MAX)) as u32
}

/// Above this magnitude an f64 carries no meaningful hundredths, and `× 100`
/// could overflow to infinity.
const EASE_ROUNDING_LIMIT: f64 = 1e12;

/// Round half away from zero to two decimals.
///
/// Values at or beyond `EASE_ROUNDING_LIMIT` and non-finite values are returned
/// unchanged.
pub fn round_ease_factor(value: f64) -> f64 {
    if !value.is_finite() || value.abs() >= EASE_ROUNDING_LIMIT {
        return value;
    }
    (value * 100.0).round() / 100.0
}

/// Round a scaled interval half away from zero, clamped into `u32`.
pub fn round_days(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    value.round().min(f64::from(u32::MAX)) as u32
}
