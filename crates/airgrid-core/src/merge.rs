//! Merging real readings into a synthetic baseline

use tracing::debug;

use crate::types::{DataPoint, Series};

/// Default distance under which a real and a synthetic point share a slot
pub const DEFAULT_COINCIDENCE_TOLERANCE_MS: i64 = 60_000;

/// Overlay `real` onto `synthetic`.
///
/// Each real point, in order, replaces the first synthetic entry not yet
/// claimed by another real point and lying strictly closer than
/// `tolerance_ms`, or is appended when none does. Real points are never
/// replaced. The result is sorted by timestamp and keeps the newest
/// `max_len` entries.
pub fn merge_with_synthetic(
    synthetic: &[DataPoint],
    real: &[DataPoint],
    tolerance_ms: i64,
    max_len: usize,
) -> Series {
    let mut combined: Series = synthetic.to_vec();
    // Only the synthetic prefix is searchable; appended real points sit past its end
    let mut claimed = vec![false; synthetic.len()];
    let tolerance = tolerance_ms.unsigned_abs();
    let mut replaced = 0usize;

    for point in real {
        let slot = combined.iter().zip(&claimed).position(|(existing, &taken)| {
            !taken && existing.timestamp.abs_diff(point.timestamp) < tolerance
        });
        match slot {
            Some(index) => {
                combined[index] = *point;
                claimed[index] = true;
                replaced += 1;
            }
            None => combined.push(*point),
        }
    }

    debug!(
        "Merged {} real points: {} replaced synthetic slots, {} appended",
        real.len(),
        replaced,
        real.len() - replaced
    );

    combined.sort_by_key(|point| point.timestamp);
    let excess = combined.len().saturating_sub(max_len);
    combined.drain(..excess);
    combined
}
