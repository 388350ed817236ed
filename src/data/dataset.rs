use burn::data::dataset::Dataset;

use crate::data::padder::pad_sequence;
use crate::domain::block_pair::EncodedPair;

/// One padded pair, ready for batching.
/// Both sides are exactly `max_seq_len` ids long.
#[derive(Debug, Clone, PartialEq)]
pub struct PairSample {
    pub left:  Vec<u32>,
    pub right: Vec<u32>,
    pub label: f32,
}

impl PairSample {
    pub fn from_encoded(pair: &EncodedPair, max_seq_len: usize) -> Self {
        Self {
            left:  pad_sequence(&pair.left, max_seq_len),
            right: pad_sequence(&pair.right, max_seq_len),
            label: pair.target(),
        }
    }

    pub fn seq_len(&self) -> usize {
        self.left.len()
    }
}

pub struct PairDataset {
    samples: Vec<PairSample>,
}

impl PairDataset {
    pub fn new(samples: Vec<PairSample>) -> Self { Self { samples } }

    pub fn from_encoded(pairs: &[EncodedPair], max_seq_len: usize) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|p| PairSample::from_encoded(p, max_seq_len))
                .collect(),
        )
    }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<PairSample> for PairDataset {
    fn get(&self, index: usize) -> Option<PairSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_are_padded() {
        let pair = EncodedPair { left: vec![4, 5], right: vec![1, 2, 3, 4], label: Some(true) };
        let sample = PairSample::from_encoded(&pair, 3);
        assert_eq!(sample.left, vec![0, 4, 5]);
        assert_eq!(sample.right, vec![2, 3, 4]);
        assert_eq!(sample.label, 1.0);
        assert_eq!(sample.seq_len(), 3);
    }

    #[test]
    fn test_dataset_access() {
        let pairs = vec![
            EncodedPair { left: vec![1], right: vec![1], label: Some(true) },
            EncodedPair { left: vec![2], right: vec![3], label: Some(false) },
        ];
        let ds = PairDataset::from_encoded(&pairs, 2);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.sample_count(), 2);
        assert_eq!(ds.get(1).unwrap().label, 0.0);
        assert!(ds.get(2).is_none());
    }
}
