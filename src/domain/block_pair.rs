// ============================================================
// Layer 3 — CodeBlockPair Domain Types
// ============================================================
// One row of an evaluation table is two basic blocks of code
// (e.g. the x86 and the ARM compilation of the same source)
// and, optionally, a ground-truth label saying whether the two
// blocks are semantically equivalent.
//
// The same row goes through two shapes in the pipeline:
//
//   CodeBlockPair  — raw text straight from the CSV
//        │
//        ▼  (vocabulary pass)
//   EncodedPair    — token ids, unknown tokens already dropped
//
// Reference: Rust Book §5 (Structs)

/// A raw pair of code blocks loaded from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlockPair {
    /// Text of the left block (first designated column)
    pub left: String,

    /// Text of the right block (second designated column)
    pub right: String,

    /// Ground truth: `Some(true)` when the blocks are equivalent.
    /// `None` when the table was loaded without a label column.
    pub label: Option<bool>,
}

impl CodeBlockPair {
    /// Create an unlabelled pair.
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left:  left.into(),
            right: right.into(),
            label: None,
        }
    }

    /// Attach a ground-truth label.
    pub fn with_label(mut self, label: bool) -> Self {
        self.label = Some(label);
        self
    }
}

/// A pair after the vocabulary pass: each side is the ordered
/// sequence of token ids (duplicates preserved, unknowns dropped).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPair {
    pub left:  Vec<u32>,
    pub right: Vec<u32>,
    pub label: Option<bool>,
}

impl EncodedPair {
    /// Label as the float target the model is trained against.
    /// Unlabelled pairs map to 0.0.
    pub fn target(&self) -> f32 {
        match self.label {
            Some(true) => 1.0,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_label() {
        let pair = CodeBlockPair::new("mov eax, 1", "mov r0, #1").with_label(true);
        assert_eq!(pair.label, Some(true));
        assert_eq!(pair.left, "mov eax, 1");
    }

    #[test]
    fn test_target() {
        let pos = EncodedPair { left: vec![1], right: vec![1], label: Some(true) };
        let neg = EncodedPair { left: vec![1], right: vec![2], label: Some(false) };
        assert_eq!(pos.target(), 1.0);
        assert_eq!(neg.target(), 0.0);
    }
}
