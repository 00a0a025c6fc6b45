//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Floor a f64 and clamp it to the u64 range, returning 0 for negative or NaN values.
#[must_use]
pub fn floor_f64_to_u64(value: f64) -> u64 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    let max = cast::<u64, f64>(u64::MAX).unwrap_or(f64::MAX);
    cast::<f64, u64>(value.min(max).floor()).unwrap_or(u64::MAX)
}

/// Round a f32 to one decimal place, the precision sizes are displayed at.
#[must_use]
pub fn round_to_tenth(value: f32) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 10.0).round() / 10.0
}

/// Convert u64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn u64_to_f64(value: u64) -> f64 {
    cast::<u64, f64>(value).unwrap_or(0.0)
}

/// Convert u32 to f32 while allowing precision loss in a single location.
#[must_use]
pub fn u32_to_f32(value: u32) -> f32 {
    cast::<u32, f32>(value).unwrap_or(0.0)
}

/// Number of fixed steps of `step_secs` closest to `secs`, saturating at the u32 range.
#[must_use]
pub fn secs_to_ticks(secs: f32, step_secs: f32) -> u32 {
    if !secs.is_finite() || secs <= 0.0 || step_secs <= 0.0 {
        return 0;
    }
    cast::<f32, u32>((secs / step_secs).round()).unwrap_or(u32::MAX)
}

/// Whole ticks contained in a span of milliseconds.
#[must_use]
pub const fn whole_ticks(span_ms: u64, tick_ms: u64) -> u64 {
    if tick_ms == 0 { 0 } else { span_ms / tick_ms }
}
