// ============================================================
// Layer 4 — Sequence Padder
// ============================================================
// Brings every id sequence to exactly `max_len` entries:
//
//   too long  → keep the LAST max_len ids (drop from the front)
//   too short → prepend PAD_ID until it fits
//
// Example with max_len = 5:
//   [1, 2, 3]             → [0, 0, 1, 2, 3]
//   [1, 2, 3, 4, 5, 6]    → [2, 3, 4, 5, 6]
//   []                    → [0, 0, 0, 0, 0]
//
// Left padding keeps the real tokens next to the final LSTM
// step, which is the only state the second layer returns.

use crate::data::vocabulary::PAD_ID;

/// Pad or truncate one sequence to `max_len`.
pub fn pad_sequence(ids: &[u32], max_len: usize) -> Vec<u32> {
    if ids.len() >= max_len {
        return ids[ids.len() - max_len..].to_vec();
    }
    let mut out = vec![PAD_ID; max_len - ids.len()];
    out.extend_from_slice(ids);
    out
}

/// Pad or truncate every sequence to `max_len`, preserving order.
pub fn pad_sequences<S: AsRef<[u32]>>(sequences: &[S], max_len: usize) -> Vec<Vec<u32>> {
    sequences
        .iter()
        .map(|s| pad_sequence(s.as_ref(), max_len))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_pads_short() {
        assert_eq!(pad_sequence(&[1, 2, 3], 5), vec![0, 0, 1, 2, 3]);
    }

    #[test]
    fn test_front_truncates_long() {
        assert_eq!(pad_sequence(&[1, 2, 3, 4, 5, 6], 5), vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_empty_becomes_zeros() {
        assert_eq!(pad_sequence(&[], 3), vec![0, 0, 0]);
    }

    #[test]
    fn test_exact_length_unchanged() {
        assert_eq!(pad_sequence(&[7, 8], 2), vec![7, 8]);
    }

    #[test]
    fn test_batch_keeps_order() {
        let padded = pad_sequences(&[vec![1], vec![2, 3, 4]], 2);
        assert_eq!(padded, vec![vec![0, 1], vec![3, 4]]);
    }
}
