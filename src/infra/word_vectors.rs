// ============================================================
// Layer 6 — Word Vector Store
// ============================================================
// Loads a pretrained word2vec model from the standard
// interchange formats and serves exact-token lookups.
//
// Text format:
//   <count> <dim>
//   MOV 0.12 -0.03 ... (dim values)
//   EAX, 0.44 0.91 ...
//
// Binary format (word2vec C tool / gensim save_word2vec_format):
//   <count> <dim>\n
//   MOV<space><dim × f32 little-endian>[\n]
//   EAX,<space><dim × f32 little-endian>[\n]
//
// Vectors are stored in one flat Vec<f32> (row per word) with a
// HashMap from word to row, so lookups hand out slices without
// copying.
//
// Reference: Mikolov et al. (2013) word2vec
//            Rust Book §12 (I/O and File Handling)

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

use crate::domain::traits::WordVectorSource;

/// On-disk layout of a word-vector file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WordVectorFormat {
    Text,
    Binary,
    /// Binary for a `.bin` extension, text otherwise
    Auto,
}

impl WordVectorFormat {
    fn resolve(self, path: &Path) -> Self {
        match self {
            WordVectorFormat::Auto => {
                if path.extension().and_then(|e| e.to_str()) == Some("bin") {
                    WordVectorFormat::Binary
                } else {
                    WordVectorFormat::Text
                }
            }
            other => other,
        }
    }
}

/// In-memory word → vector table.
#[derive(Debug, Clone)]
pub struct WordVectors {
    dim:     usize,
    index:   HashMap<String, usize>,
    vectors: Vec<f32>,
}

impl WordVectors {
    /// Build from (word, vector) entries; every vector must have `dim` values.
    pub fn from_entries(
        dim:     usize,
        entries: impl IntoIterator<Item = (String, Vec<f32>)>,
    ) -> Result<Self> {
        let mut wv = Self {
            dim,
            index:   HashMap::new(),
            vectors: Vec::new(),
        };
        for (word, vector) in entries {
            wv.insert(word, &vector)?;
        }
        Ok(wv)
    }

    /// Load from disk in the given format.
    pub fn load(path: impl AsRef<Path>, format: WordVectorFormat) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Cannot open word vectors '{}'", path.display()))?;
        let mut reader = BufReader::new(file);

        let wv = match format.resolve(path) {
            WordVectorFormat::Binary => Self::read_binary(&mut reader),
            _ => Self::read_text(&mut reader),
        }
        .with_context(|| format!("Invalid word vectors '{}'", path.display()))?;

        if wv.is_empty() {
            tracing::warn!("Word vectors '{}' contain no words", path.display());
        }

        tracing::info!(
            "Loaded {} word vectors (dim={}) from '{}'",
            wv.len(),
            wv.dim,
            path.display()
        );
        Ok(wv)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn insert(&mut self, word: String, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dim {
            bail!(
                "Vector for '{}' has {} values, expected {}",
                word,
                vector.len(),
                self.dim
            );
        }
        // The first occurrence of a word wins
        if self.index.contains_key(&word) {
            tracing::warn!("Duplicate word '{}' in word vectors; keeping the first vector", word);
            return Ok(());
        }
        self.index.insert(word, self.vectors.len() / self.dim.max(1));
        self.vectors.extend_from_slice(vector);
        Ok(())
    }

    fn read_text(reader: &mut impl BufRead) -> Result<Self> {
        let (count, dim) = read_header(reader)?;
        let mut wv = Self::from_entries(dim, std::iter::empty())?;

        let mut line = String::new();
        let mut line_no = 1usize;
        let mut records = 0usize;
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            line_no += 1;
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else {
                continue;
            };
            let vector = parts
                .map(|v| v.parse::<f32>())
                .collect::<std::result::Result<Vec<f32>, _>>()
                .with_context(|| format!("Line {}: unparsable value for '{}'", line_no, word))?;
            wv.insert(word.to_string(), &vector)
                .with_context(|| format!("Line {}", line_no))?;
            records += 1;
        }

        check_count(count, records)?;
        Ok(wv)
    }

    fn read_binary(reader: &mut impl BufRead) -> Result<Self> {
        let (count, dim) = read_header(reader)?;
        let mut wv = Self::from_entries(dim, std::iter::empty())?;

        let mut word_buf = Vec::new();
        let mut vec_buf  = vec![0u8; dim * 4];

        for n in 0..count {
            word_buf.clear();
            reader.read_until(b' ', &mut word_buf)?;
            if word_buf.last() != Some(&b' ') {
                bail!("Unexpected end of file after {} of {} words", n, count);
            }
            word_buf.pop();

            // Records may be separated by a newline
            let start = word_buf.iter().position(|&b| b != b'\n').unwrap_or(word_buf.len());
            let word = String::from_utf8_lossy(&word_buf[start..]).into_owned();

            reader
                .read_exact(&mut vec_buf)
                .with_context(|| format!("Truncated vector for '{}'", word))?;
            let vector: Vec<f32> = vec_buf
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect();

            wv.insert(word, &vector)?;
        }

        Ok(wv)
    }
}

impl WordVectorSource for WordVectors {
    fn dim(&self) -> usize {
        self.dim
    }

    fn vector(&self, token: &str) -> Option<&[f32]> {
        self.index
            .get(token)
            .map(|&row| &self.vectors[row * self.dim..(row + 1) * self.dim])
    }
}

/// Parse the `<count> <dim>` header line.
fn read_header(reader: &mut impl BufRead) -> Result<(usize, usize)> {
    let mut header = String::new();
    reader.read_line(&mut header)?;
    let mut parts = header.split_whitespace();

    let mut field = |name: &str| -> Result<usize> {
        parts
            .next()
            .ok_or_else(|| anyhow!("Header is missing the {} field", name))?
            .parse::<usize>()
            .with_context(|| format!("Header {} is not a number", name))
    };

    let count = field("count")?;
    let dim   = field("dim")?;
    if dim == 0 {
        bail!("Header declares zero-dimensional vectors");
    }
    Ok((count, dim))
}

fn check_count(declared: usize, found: usize) -> Result<()> {
    if declared != found {
        bail!("Header declares {} words but {} were read", declared, found);
    }
    Ok(())
}
