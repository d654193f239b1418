//! Rebuilding sample maps from per-key tables.

use modforge_model::{KeyRange, SampleMap};

/// Collapse a per-key table of sample indices into a [`SampleMap`].
///
/// A table that maps every key to the same sample becomes `Single`; anything
/// else becomes one range per run of equal entries. Unmapped keys are skipped.
pub(crate) fn sample_map_from_keys(keys: &[Option<usize>]) -> SampleMap {
    if let Some(Some(first)) = keys.first() {
        if keys.iter().all(|key| *key == Some(*first)) {
            return SampleMap::Single(*first);
        }
    }

    let mut ranges: Vec<KeyRange> = Vec::new();
    for (pitch, key) in keys.iter().enumerate() {
        let Some(sample) = *key else {
            continue;
        };
        let pitch = pitch as u8;
        match ranges.last_mut() {
            Some(last) if last.sample == sample && last.high + 1 == pitch => last.high = pitch,
            _ => ranges.push(KeyRange {
                low: pitch,
                high: pitch,
                sample,
            }),
        }
    }
    SampleMap::Ranges(ranges)
}
