// ============================================================
// Layer 4 — Vocabulary Builder
// ============================================================
// Walks every row of every table, tokenizes both code blocks,
// and gives each distinct token an integer id.
//
// Id policy:
//   0      <unk> placeholder, doubles as the padding sentinel.
//          Never assigned to a real token.
//   1..=n  real tokens, in first-seen order
//
// Unknown tokens:
//   A token the word-embedding model has never seen has no
//   vector to look up, so it is dropped from the encoded
//   sequence entirely (it is NOT mapped to id 0). Every drop is
//   counted in a VocabularyReport so the caller can see how much
//   text was lost.
//
// Ordering:
//   Ids depend only on iteration order: tables in the order
//   given, rows in file order, left block before right block.
//   Feed the same tables in the same order and you get the
//   same ids.
//
// The builder never mutates its input rows; it returns a fresh
// EncodedPair for each one.

use std::collections::{HashMap, HashSet};

use crate::data::tokenizer::tokenize;
use crate::domain::block_pair::{CodeBlockPair, EncodedPair};
use crate::domain::traits::WordVectorSource;

/// Id reserved for "no token" (padding / unknown placeholder)
pub const PAD_ID: u32 = 0;

/// Name stored at id 0 of the id → token list
pub const UNK_TOKEN: &str = "<unk>";

// ─── Vocabulary ───────────────────────────────────────────────────────────────
/// Immutable token ↔ id mapping produced by a build pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    token_to_id: HashMap<String, u32>,
    /// id → token; index 0 holds UNK_TOKEN
    id_to_token: Vec<String>,
}

impl Vocabulary {
    fn empty() -> Self {
        Self {
            token_to_id: HashMap::new(),
            id_to_token: vec![UNK_TOKEN.to_string()],
        }
    }

    /// Number of real tokens (the placeholder is not counted)
    pub fn len(&self) -> usize {
        self.id_to_token.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rows an embedding matrix needs: one per token plus the sentinel
    pub fn matrix_rows(&self) -> usize {
        self.id_to_token.len()
    }

    pub fn get_id(&self, token: &str) -> Option<u32> {
        self.token_to_id.get(token).copied()
    }

    /// Real tokens with their ids, in id order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.id_to_token
            .iter()
            .enumerate()
            .skip(1)
            .map(|(id, token)| (id as u32, token.as_str()))
    }

    fn intern(&mut self, token: &str) -> u32 {
        if let Some(id) = self.get_id(token) {
            return id;
        }
        let id = self.id_to_token.len() as u32;
        self.token_to_id.insert(token.to_string(), id);
        self.id_to_token.push(token.to_string());
        id
    }
}

// ─── VocabularyReport ─────────────────────────────────────────────────────────
/// Data-quality counters collected during the build pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VocabularyReport {
    /// Rows scanned across all tables
    pub rows: usize,
    /// Token occurrences that received an id
    pub kept_tokens: usize,
    /// Token occurrences dropped because the embedding source lacks them
    pub dropped_tokens: usize,
    /// Distinct dropped tokens
    pub distinct_dropped: usize,
}

impl VocabularyReport {
    /// Fraction of token occurrences dropped, in [0, 1]
    pub fn drop_rate(&self) -> f64 {
        let total = self.kept_tokens + self.dropped_tokens;
        if total == 0 {
            0.0
        } else {
            self.dropped_tokens as f64 / total as f64
        }
    }
}

// ─── VocabularyBuilder ────────────────────────────────────────────────────────
/// Single-pass builder. Owns the growing vocabulary; consumed by
/// `finish()` so the result can't be mutated afterwards.
pub struct VocabularyBuilder<'a, S: WordVectorSource + ?Sized> {
    source:  &'a S,
    vocab:   Vocabulary,
    report:  VocabularyReport,
    unknown: HashSet<String>,
}

impl<'a, S: WordVectorSource + ?Sized> VocabularyBuilder<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            vocab:   Vocabulary::empty(),
            report:  VocabularyReport::default(),
            unknown: HashSet::new(),
        }
    }

    /// Encode one block of text, registering new tokens as they appear.
    pub fn encode_text(&mut self, text: &str) -> Vec<u32> {
        let mut ids = Vec::new();
        for token in tokenize(text) {
            if !self.source.contains(&token) {
                tracing::debug!("Unknown token dropped: '{}'", token);
                self.report.dropped_tokens += 1;
                self.unknown.insert(token);
                continue;
            }
            ids.push(self.vocab.intern(&token));
            self.report.kept_tokens += 1;
        }
        ids
    }

    /// Encode one row: left block first, then right block.
    pub fn encode_pair(&mut self, pair: &CodeBlockPair) -> EncodedPair {
        self.report.rows += 1;
        let left  = self.encode_text(&pair.left);
        let right = self.encode_text(&pair.right);
        EncodedPair { left, right, label: pair.label }
    }

    /// Encode a whole table in row order.
    pub fn encode_table(&mut self, rows: &[CodeBlockPair]) -> Vec<EncodedPair> {
        rows.iter().map(|row| self.encode_pair(row)).collect()
    }

    /// Freeze the vocabulary and return it with the drop report.
    pub fn finish(mut self) -> (Vocabulary, VocabularyReport) {
        self.report.distinct_dropped = self.unknown.len();

        if self.report.dropped_tokens > 0 {
            tracing::warn!(
                "Dropped {} token occurrences ({} distinct, {:.2}% of all tokens) \
                 unknown to the word-vector model",
                self.report.dropped_tokens,
                self.report.distinct_dropped,
                self.report.drop_rate() * 100.0,
            );
        }

        tracing::info!(
            "Vocabulary built: {} tokens from {} rows",
            self.vocab.len(),
            self.report.rows
        );
        (self.vocab, self.report)
    }
}

/// Everything a build pass produces.
#[derive(Debug, Clone)]
pub struct EncodedCorpus {
    pub vocabulary: Vocabulary,
    /// One encoded table per input table, same order
    pub tables:     Vec<Vec<EncodedPair>>,
    pub report:     VocabularyReport,
}

/// Build the vocabulary across `tables` (in the given order) and
/// encode every row.
pub fn build_vocabulary<S>(tables: &[&[CodeBlockPair]], source: &S) -> EncodedCorpus
where
    S: WordVectorSource + ?Sized,
{
    let mut builder = VocabularyBuilder::new(source);
    let encoded: Vec<Vec<EncodedPair>> = tables
        .iter()
        .map(|table| builder.encode_table(table))
        .collect();
    let (vocabulary, report) = builder.finish();

    EncodedCorpus {
        vocabulary,
        tables: encoded,
        report,
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::word_vectors::WordVectors;

    fn source() -> WordVectors {
        WordVectors::from_entries(
            2,
            vec![
                ("MOV".to_string(), vec![1.0, 0.0]),
                ("EAX,".to_string(), vec![0.0, 1.0]),
                ("EBX".to_string(), vec![1.0, 1.0]),
                ("R0,".to_string(), vec![0.5, 0.5]),
                ("#1".to_string(), vec![0.2, 0.3]),
            ],
        )
        .unwrap()
    }

    fn rows() -> Vec<CodeBlockPair> {
        vec![
            CodeBlockPair::new("mov eax, ebx", "mov r0, #1").with_label(true),
            CodeBlockPair::new("mov ebx, eax", "mov r0, r1").with_label(false),
        ]
    }

    #[test]
    fn test_first_seen_order_from_one() {
        let src = source();
        let corpus = build_vocabulary(&[&rows()], &src);
        let vocab = &corpus.vocabulary;

        assert_eq!(vocab.get_id("MOV"), Some(1));
        assert_eq!(vocab.get_id("EAX,"), Some(2));
        assert_eq!(vocab.get_id("EBX"), Some(3));
        assert_eq!(vocab.get_id("R0,"), Some(4));
        assert_eq!(vocab.get_id("#1"), Some(5));
        assert_eq!(vocab.len(), 5);
        assert_eq!(vocab.matrix_rows(), 6);
        assert_eq!(vocab.iter().next(), Some((1, "MOV")));
        assert!(vocab.iter().all(|(id, token)| id != PAD_ID && token != UNK_TOKEN));
    }

    #[test]
    fn test_ids_reused_across_rows_and_columns() {
        let src = source();
        let corpus = build_vocabulary(&[&rows()], &src);
        let table = &corpus.tables[0];

        // MOV appears in every block and always maps to 1
        assert_eq!(table[0].left[0], 1);
        assert_eq!(table[0].right[0], 1);
        assert_eq!(table[1].left[0], 1);
        assert_eq!(table[1].right[0], 1);
    }

    #[test]
    fn test_unknown_tokens_dropped_not_zeroed() {
        let src = source();
        let corpus = build_vocabulary(&[&rows()], &src);
        let table = &corpus.tables[0];

        // "ebx," and "eax" (without comma) are unknown in row 2 left
        assert_eq!(table[1].left, vec![1]);
        // "r1" unknown in row 2 right
        assert_eq!(table[1].right, vec![1, 4]);
        assert!(table.iter().all(|p| !p.left.contains(&PAD_ID) && !p.right.contains(&PAD_ID)));

        assert_eq!(corpus.report.dropped_tokens, 3);
        assert_eq!(corpus.report.distinct_dropped, 3);
        assert_eq!(corpus.report.rows, 2);
    }

    #[test]
    fn test_labels_carried_through() {
        let src = source();
        let corpus = build_vocabulary(&[&rows()], &src);
        assert_eq!(corpus.tables[0][0].label, Some(true));
        assert_eq!(corpus.tables[0][1].label, Some(false));
    }

    #[test]
    fn test_second_table_continues_numbering() {
        let src = source();
        let train = vec![CodeBlockPair::new("mov", "mov")];
        let test  = vec![CodeBlockPair::new("ebx", "mov ebx")];
        let corpus = build_vocabulary(&[&train, &test], &src);

        assert_eq!(corpus.tables.len(), 2);
        assert_eq!(corpus.tables[1][0].left, vec![2]);
        assert_eq!(corpus.tables[1][0].right, vec![1, 2]);
    }

    #[test]
    fn test_fresh_runs_are_reproducible() {
        let src = source();
        let a = build_vocabulary(&[&rows()], &src);
        let b = build_vocabulary(&[&rows()], &src);
        assert_eq!(a.vocabulary, b.vocabulary);
        assert_eq!(a.tables, b.tables);
    }

    #[test]
    fn test_drop_rate() {
        let report = VocabularyReport {
            rows: 1,
            kept_tokens: 3,
            dropped_tokens: 1,
            distinct_dropped: 1,
        };
        assert!((report.drop_rate() - 0.25).abs() < 1e-12);
        assert_eq!(VocabularyReport::default().drop_rate(), 0.0);
    }
}
