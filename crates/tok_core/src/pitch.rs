//! Pitch geometry and match-clock constants shared by the encoder and the
//! validator.
//!
//! StatsBomb coordinates run 0-120 along the length of the pitch and 0-80
//! across it, regardless of the real stadium dimensions.

/// Pitch length in meters (x axis, goal to goal).
pub const LENGTH_M: f64 = 120.0;

/// Pitch width in meters (y axis, touchline to touchline).
pub const WIDTH_M: f64 = 80.0;

/// Maximum recorded shot height in meters (from data exploration of the
/// open-data corpus).
pub const MAX_SHOT_HEIGHT_M: f64 = 5.0;

/// Maximum event duration in seconds covered by the duration feature.
pub const MAX_EVENT_DURATION_S: f64 = 3.0;

/// Pass angles are radians in (-pi, pi]; the feature range is padded to
/// +/-3.15 so the boundary values normalize cleanly.
pub const MAX_PASS_ANGLE: f64 = 3.15;

/// Minutes in a regulation half.
pub const HALF_MINUTES: i64 = 45;

/// Minutes in one extra-time period.
pub const EXTRA_PERIOD_MINUTES: i64 = 15;

/// Upper bound of the period-relative minute feature. Regulation halves top
/// out at 45 plus stoppage; 60 leaves room for long stoppages.
pub const MAX_PERIOD_MINUTE: f64 = 60.0;

/// Translate an absolute match minute into an offset from the start of its
/// period. Period 5 is the penalty shootout, which has no meaningful clock;
/// it maps to the configured maximum.
pub fn period_relative_minute(minute: f64, period: i64) -> f64 {
    match period {
        1 | 2 => minute - (HALF_MINUTES * (period - 1)) as f64,
        3 | 4 => minute - (2 * HALF_MINUTES + EXTRA_PERIOD_MINUTES * (period - 3)) as f64,
        _ => MAX_PERIOD_MINUTE,
    }
}

/// Euclidean distance in meters between two normalized pitch locations,
/// denormalizing each axis by its own extent.
pub fn distance_m(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    let dx = (bx - ax) * LENGTH_M;
    let dy = (by - ay) * WIDTH_M;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minute_offsets_per_period() {
        assert_eq!(period_relative_minute(15.0, 1), 15.0);
        assert_eq!(period_relative_minute(60.0, 2), 15.0);
        assert_eq!(period_relative_minute(105.0, 3), 15.0);
        assert_eq!(period_relative_minute(120.0, 4), 15.0);
        assert_eq!(period_relative_minute(47.0, 5), MAX_PERIOD_MINUTE);
    }

    #[test]
    fn distance_uses_per_axis_extents() {
        // Full length of the pitch, no lateral movement.
        assert_eq!(distance_m(0.0, 0.5, 1.0, 0.5), LENGTH_M);
        // Full width.
        assert_eq!(distance_m(0.5, 0.0, 0.5, 1.0), WIDTH_M);
    }
}
