use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use crate::domain::subscriber::Subscriber;

/// A timestamp layout and whether it carries a fractional second.
struct TimestampLayout {
    format: &'static str,
    fractional: bool,
}

/// Accepted timestamp layouts, most specific first. Both timestamps of a subscriber must
/// parse with the same layout.
const TIMESTAMP_LAYOUTS: [TimestampLayout; 3] = [
    // `%.f` alone would also accept a missing fraction
    TimestampLayout {
        format: "%Y-%m-%dT%H:%M:%S%.fZ",
        fractional: true,
    },
    TimestampLayout {
        format: "%Y-%m-%dT%H:%M:%SZ",
        fractional: false,
    },
    TimestampLayout {
        format: "%Y-%m-%d %H:%M:%S",
        fractional: false,
    },
];

/// Whole days between subscription and the last update for inactive subscribers.
///
/// Returns `None` for any other status, when a timestamp is missing or when the pair
/// does not match one of the accepted layouts. Negative spans are reported as 0.
pub fn calculate_days_to_unsubscribe(subscriber: &Subscriber) -> Option<u64> {
    if !subscriber.status.is_inactive() {
        return None;
    }

    let created_at = subscriber.created_at.as_deref()?;
    let updated_at = subscriber.updated_at.as_deref()?;

    let (created_at, updated_at) = TIMESTAMP_LAYOUTS.iter().find_map(|layout| {
        match (parse_utc(created_at, layout), parse_utc(updated_at, layout)) {
            (Some(created_at), Some(updated_at)) => Some((created_at, updated_at)),
            _ => None,
        }
    })?;

    let days = (updated_at - created_at).num_days().max(0);

    Some(days as u64)
}

/// Fills `days_to_unsubscribe` on every subscriber.
pub fn annotate_days_to_unsubscribe(subscribers: &mut [Subscriber]) {
    for subscriber in subscribers.iter_mut() {
        subscriber.days_to_unsubscribe = calculate_days_to_unsubscribe(subscriber);
    }
}

fn parse_utc(timestamp: &str, layout: &TimestampLayout) -> Option<DateTime<Utc>> {
    let timestamp = timestamp.trim();

    if layout.fractional && !timestamp.contains('.') {
        return None;
    }

    NaiveDateTime::parse_from_str(timestamp, layout.format)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}
