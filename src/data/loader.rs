// ============================================================
// Layer 4 — CSV Pair Loader
// ============================================================
// Loads a comma-separated table and projects every row onto
// the two designated code-block columns (plus, optionally, the
// label column).
//
// Why a real CSV reader?
//   Assembly text is full of commas ("mov eax, ebx"), so the
//   cells arrive quoted. A split(',') would shred them.
//
// Example table:
//   ,x86_bb,arm_bb,eq
//   0,"mov eax, 1","mov r0, #1",1
//   1,"xor eax, eax","ldr r1, [r2]",0
//
// Only the named columns are read; every other column (row
// index, metadata) is ignored.
//
// Empty cells:
//   An empty code cell is read as empty text and encodes to an
//   empty id sequence (all padding). It is NOT turned into a
//   missing-value marker such as "nan", so a word-vector model
//   that happens to contain the token NAN never sees it from an
//   empty cell.
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{anyhow, bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::domain::block_pair::CodeBlockPair;
use crate::domain::traits::PairSource;

/// Loads code-block pairs from a CSV file.
/// Implements the PairSource trait from Layer 3.
pub struct CsvPairLoader {
    path:         PathBuf,
    left_column:  String,
    right_column: String,
    label_column: Option<String>,
}

impl CsvPairLoader {
    /// Create a loader for `path` reading the two text columns.
    pub fn new(
        path:         impl Into<PathBuf>,
        left_column:  impl Into<String>,
        right_column: impl Into<String>,
    ) -> Self {
        Self {
            path:         path.into(),
            left_column:  left_column.into(),
            right_column: right_column.into(),
            label_column: None,
        }
    }

    /// Also read a binary label column.
    pub fn with_label_column(mut self, column: impl Into<String>) -> Self {
        self.label_column = Some(column.into());
        self
    }
}

impl PairSource for CsvPairLoader {
    fn load_all(&self) -> Result<Vec<CodeBlockPair>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .with_context(|| format!("Cannot open CSV '{}'", self.path.display()))?;

        let headers = reader
            .headers()
            .with_context(|| format!("Cannot read header row of '{}'", self.path.display()))?
            .clone();

        let find = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| {
                    anyhow!("Column '{}' not found in '{}'", name, self.path.display())
                })
        };

        let left_idx  = find(&self.left_column)?;
        let right_idx = find(&self.right_column)?;
        let label_idx = match &self.label_column {
            Some(name) => Some(find(name)?),
            None => None,
        };

        let mut pairs = Vec::new();

        for (row, record) in reader.records().enumerate() {
            // Row numbers in messages are 1-based data rows (header excluded)
            let record = record.with_context(|| {
                format!("Malformed row {} in '{}'", row + 1, self.path.display())
            })?;

            let mut pair = CodeBlockPair::new(
                field(&record, left_idx, &self.left_column, row, &self.path)?,
                field(&record, right_idx, &self.right_column, row, &self.path)?,
            );

            if let (Some(idx), Some(name)) = (label_idx, self.label_column.as_deref()) {
                let raw = field(&record, idx, name, row, &self.path)?;
                let label = parse_label(raw).with_context(|| {
                    format!("Row {} in '{}'", row + 1, self.path.display())
                })?;
                pair = pair.with_label(label);
            }

            pairs.push(pair);
        }

        tracing::info!(
            "Loaded {} pairs from '{}'",
            pairs.len(),
            self.path.display()
        );
        Ok(pairs)
    }
}

/// Fetch one cell, failing when a short row lacks the column.
fn field<'r>(
    record: &'r csv::StringRecord,
    idx:    usize,
    column: &str,
    row:    usize,
    path:   &Path,
) -> Result<&'r str> {
    record.get(idx).ok_or_else(|| {
        anyhow!(
            "Row {} in '{}' has no '{}' cell",
            row + 1,
            path.display(),
            column
        )
    })
}

/// Parse a binary label cell: 0/1, 0.0/1.0 or true/false.
fn parse_label(raw: &str) -> Result<bool> {
    let value = raw.trim();
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" => return Ok(true),
        "0" | "false" => return Ok(false),
        _ => {}
    }
    match value.parse::<f64>() {
        Ok(v) if v == 1.0 => Ok(true),
        Ok(v) if v == 0.0 => Ok(false),
        _ => bail!("Label '{}' is not a binary value", raw),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_quoted_commas_survive() {
        let f = write_csv(
            ",x86_bb,arm_bb,eq\n\
             0,\"mov eax, 1\",\"mov r0, #1\",1\n\
             1,\"xor eax, eax\",\"ldr r1, [r2]\",0\n",
        );
        let pairs = CsvPairLoader::new(f.path(), "x86_bb", "arm_bb")
            .with_label_column("eq")
            .load_all()
            .unwrap();

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].left, "mov eax, 1");
        assert_eq!(pairs[0].right, "mov r0, #1");
        assert_eq!(pairs[0].label, Some(true));
        assert_eq!(pairs[1].label, Some(false));
    }

    #[test]
    fn test_without_label_column() {
        let f = write_csv("x86_bb,arm_bb\nnop,nop\n");
        let pairs = CsvPairLoader::new(f.path(), "x86_bb", "arm_bb")
            .load_all()
            .unwrap();
        assert_eq!(pairs[0].label, None);
    }

    #[test]
    fn test_empty_cell_is_empty_text() {
        let f = write_csv("x86_bb,arm_bb,eq\n,\"mov r0, #1\",0\n\"nop\",\"\",1\n");
        let pairs = CsvPairLoader::new(f.path(), "x86_bb", "arm_bb")
            .with_label_column("eq")
            .load_all()
            .unwrap();

        assert_eq!(pairs[0].left, "");
        assert_eq!(pairs[0].right, "mov r0, #1");
        assert_eq!(pairs[1].right, "");
        assert!(crate::data::tokenizer::tokenize(&pairs[0].left).is_empty());
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let f = write_csv("x86_bb,mips_bb\nnop,nop\n");
        let err = CsvPairLoader::new(f.path(), "x86_bb", "arm_bb")
            .load_all()
            .unwrap_err();
        assert!(err.to_string().contains("arm_bb"));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let loader = CsvPairLoader::new("does/not/exist.csv", "a", "b");
        assert!(loader.load_all().is_err());
    }

    #[test]
    fn test_bad_label_is_fatal() {
        let f = write_csv("a,b,eq\nx,y,maybe\n");
        let result = CsvPairLoader::new(f.path(), "a", "b")
            .with_label_column("eq")
            .load_all();
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_label_variants() {
        assert!(parse_label("1").unwrap());
        assert!(parse_label("1.0").unwrap());
        assert!(parse_label("True").unwrap());
        assert!(!parse_label(" 0 ").unwrap());
        assert!(!parse_label("false").unwrap());
        assert!(parse_label("2").is_err());
    }
}
