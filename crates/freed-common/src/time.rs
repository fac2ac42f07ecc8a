//! ---
//! freed_section: "01-core-functionality"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Duration and rate helpers shared by the session engines."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use std::time::Duration;

/// Convert a duration into microseconds, saturating at `u64::MAX`.
pub fn duration_to_micros(duration: Duration) -> u64 {
    duration
        .as_secs()
        .saturating_mul(1_000_000)
        .saturating_add(u64::from(duration.subsec_micros()))
}

/// Offset of sample `index` in a stream running at `rate_hz`.
pub fn offset_for_index(index: u64, rate_hz: f64) -> Duration {
    if !(rate_hz.is_finite() && rate_hz > 0.0) {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(index as f64 / rate_hz)
}

/// Events per second over `elapsed`; zero when nothing elapsed.
pub fn achieved_rate(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        0.0
    } else {
        count as f64 / secs
    }
}

/// Scale a recorded offset by a playback speed factor.
pub fn scale_offset(offset: Duration, speed: f64) -> Duration {
    if !(speed.is_finite() && speed > 0.0) {
        return offset;
    }
    Duration::from_secs_f64(offset.as_secs_f64() / speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn micros_saturate() {
        assert_eq!(duration_to_micros(Duration::from_millis(3)), 3_000);
        assert_eq!(duration_to_micros(Duration::MAX), u64::MAX);
    }

    #[test]
    fn offsets_follow_rate() {
        assert_eq!(offset_for_index(0, 30.0), Duration::ZERO);
        assert_eq!(offset_for_index(50, 50.0), Duration::from_secs(1));
        assert_eq!(offset_for_index(5, 0.0), Duration::ZERO);
    }

    #[test]
    fn rate_and_speed() {
        assert_eq!(achieved_rate(30, Duration::from_secs(1)), 30.0);
        assert_eq!(achieved_rate(30, Duration::ZERO), 0.0);
        assert_eq!(
            scale_offset(Duration::from_secs(2), 2.0),
            Duration::from_secs(1)
        );
        assert_eq!(
            scale_offset(Duration::from_secs(2), -1.0),
            Duration::from_secs(2)
        );
    }
}
