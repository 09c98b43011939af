use serde::{Deserialize, Serialize};

use crate::domain::subscriber::Subscriber;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_subscribers: u64,
    pub active_subscribers: u64,
    pub inactive_subscribers: u64,
    pub percent_clicked_once: f64,
    pub subscribers: Vec<Subscriber>,
}

/// Aggregates over the full subscriber list. The list is passed through untouched.
pub fn compute_metrics(subscribers: Vec<Subscriber>) -> MetricsSummary {
    let total_subscribers = subscribers.len() as u64;
    let clicked_once = subscribers
        .iter()
        .filter(|subscriber| subscriber.stats.has_clicked())
        .count() as u64;
    let active_subscribers = subscribers
        .iter()
        .filter(|subscriber| subscriber.status.is_active())
        .count() as u64;
    let inactive_subscribers = subscribers
        .iter()
        .filter(|subscriber| subscriber.status.is_inactive())
        .count() as u64;

    MetricsSummary {
        total_subscribers,
        active_subscribers,
        inactive_subscribers,
        percent_clicked_once: percentage(clicked_once, total_subscribers),
        subscribers,
    }
}

/// `part / total * 100` rounded to one decimal, 0 for an empty total.
fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }

    round_to_one_decimal(100.0 * part as f64 / total as f64)
}

/// Rounds the exact binary value of a non-negative float to one decimal, ties to even.
///
/// `(value * 10.0).round()` is not enough: the multiplication itself rounds, so `0.15`
/// (stored as 0.1499...) would become a tie and round up.
fn round_to_one_decimal(value: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 0.0;
    }

    let bits = value.to_bits();
    let biased_exponent = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exponent) = if biased_exponent == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased_exponent - 1075)
    };

    // Whole numbers need no rounding
    if exponent >= 0 {
        return value;
    }

    let shift = (-exponent) as u32;

    // Anything below 2^-60 is far under 0.05
    if shift > 112 {
        return 0.0;
    }

    // value * 10 == scaled / 2^shift, computed exactly
    let scaled = u128::from(mantissa) * 10;
    let mut tenths = scaled >> shift;
    let remainder = scaled - (tenths << shift);
    let half = 1u128 << (shift - 1);

    if remainder > half || (remainder == half && tenths % 2 == 1) {
        tenths += 1;
    }

    tenths as f64 / 10.0
}
