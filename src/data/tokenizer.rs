// ============================================================
// Layer 4 — Tokenizer
// ============================================================
// Splits a raw field into tokens for the vocabulary pass.
//
// The word-embedding model was trained on uppercased assembly,
// so the policy is minimal:
//   1. Coerce the value to text
//   2. Uppercase it
//   3. Split on runs of whitespace
//
// No punctuation stripping: "EAX," and "EAX" are different
// tokens, exactly as the embedding model saw them.
//
// Reference: Rust Book §8 (Strings in Rust)

use std::fmt::Display;

/// Turn any displayable value into its ordered token list.
///
/// ```ignore
/// assert_eq!(tokenize("foo BAR  baz"), vec!["FOO", "BAR", "BAZ"]);
/// assert_eq!(tokenize(123), vec!["123"]);
/// ```
pub fn tokenize(value: impl Display) -> Vec<String> {
    value
        .to_string()
        .to_uppercase()
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uppercases_and_splits() {
        assert_eq!(tokenize("foo BAR  baz"), vec!["FOO", "BAR", "BAZ"]);
    }

    #[test]
    fn test_numbers_are_coerced() {
        assert_eq!(tokenize(123), vec!["123"]);
    }

    #[test]
    fn test_idempotent_on_normalised_input() {
        let once  = tokenize("mov eax, ebx");
        let twice = tokenize(once.join(" "));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_keeps_punctuation() {
        assert_eq!(tokenize("add r0,\tr1"), vec!["ADD", "R0,", "R1"]);
    }

    #[test]
    fn test_empty_and_blank() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \n\t ").is_empty());
    }
}
