//! Beat-to-time conversion.
//!
//! Beat indices are converted to absolute millisecond offsets once per loaded
//! track. Results are rounded to thousandths of a millisecond so long tracks
//! do not accumulate floating-point error.

/// Milliseconds in one minute.
pub const MS_PER_MINUTE: f64 = 60_000.0;

/// Signature denominator that halves the beat duration.
pub const EIGHTH_NOTE_BEAT_TYPE: u32 = 8;

/// Duration of one beat in milliseconds.
///
/// `60000 / bpm`, halved for eighth-note denominated signatures.
pub fn beat_duration_ms(bpm: f64, beat_type: u32) -> f64 {
    let duration = MS_PER_MINUTE / bpm;
    if beat_type == EIGHTH_NOTE_BEAT_TYPE {
        duration / 2.0
    } else {
        duration
    }
}

/// Absolute fire time of a beat index, rounded to 3 decimal places.
pub fn fire_time_ms(beat: u32, beat_duration_ms: f64) -> f64 {
    round_thousandths(beat as f64 * beat_duration_ms)
}

fn round_thousandths(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
