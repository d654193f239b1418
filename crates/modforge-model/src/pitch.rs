//! Sample rate and tuning conversions.
//!
//! XM and IT both expect samples tuned so that 8363 Hz plays the reference
//! pitch. XM stores the offset from that rate as a relative note plus finetune;
//! IT stores the adjusted playback rate directly. The conversions return `None`
//! when the result does not fit the format's field, and validation refuses
//! such samples.

/// Reference playback rate of both formats.
pub const BASE_FREQ: f64 = 8363.0;

/// Semitone offset of a sample rate plus tuning offsets from [`BASE_FREQ`].
fn semitones(sample_rate: u32, relative_note: i8, finetune: i8) -> f64 {
    12.0 * (sample_rate as f64 / BASE_FREQ).log2() + relative_note as f64 + finetune as f64 / 128.0
}

/// XM `(finetune, relative_note)` for a sample rate and tuning offsets.
pub fn xm_pitch_correction(sample_rate: u32, relative_note: i8, finetune: i8) -> Option<(i8, i8)> {
    let semitones = semitones(sample_rate, relative_note, finetune);
    if !semitones.is_finite() {
        return None;
    }
    let mut relative = semitones.floor() as i32;
    let mut fine = ((semitones - relative as f64) * 128.0).round() as i32;

    if fine >= 128 {
        fine -= 128;
        relative += 1;
    }
    // Keep finetune in -64..=63 so readers that treat it as signed agree.
    if fine >= 64 {
        fine -= 128;
        relative += 1;
    }

    Some((i8::try_from(fine).ok()?, i8::try_from(relative).ok()?))
}

/// Sample rate that plays the XM reference pitch for `(finetune, relative_note)`.
pub fn xm_sample_rate(finetune: i8, relative_note: i8) -> u32 {
    let semitones = relative_note as f64 + finetune as f64 / 128.0;
    (BASE_FREQ * 2f64.powf(semitones / 12.0)).round() as u32
}

/// IT C-5 speed for a sample rate and tuning offsets.
pub fn it_c5_speed(sample_rate: u32, relative_note: i8, finetune: i8) -> Option<u32> {
    if relative_note == 0 && finetune == 0 {
        return Some(sample_rate);
    }
    let offset = relative_note as f64 + finetune as f64 / 128.0;
    let speed = (sample_rate as f64 * 2f64.powf(offset / 12.0)).round();
    if (1.0..=u32::MAX as f64).contains(&speed) {
        Some(speed as u32)
    } else {
        None
    }
}
