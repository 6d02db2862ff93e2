// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Finds, builds and wraps the tokenizer behind TextEncoder.
//
// resolve(name) looks in this order:
//   1. `name` as a tokenizer.json file, or a directory with one
//   2. the same under the store directory
//   3. the HuggingFace hub (only with the `hub` feature)
//
// load_or_build() is the offline fallback: a word-level
// vocabulary counted from the training texts, written as a
// HuggingFace tokenizer.json and loaded back through
// Tokenizer::from_file, so a built tokenizer and a downloaded
// one go through the same code path.
//
// Reference: HuggingFace tokenizers documentation

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use crate::domain::traits::{Encoded, PaddingPolicy, TextEncoder};
use crate::error::{DataError, Result};

pub const TOKENIZER_FILE: &str = "tokenizer.json";

pub const PAD_TOKEN: &str = "[PAD]";
pub const UNK_TOKEN: &str = "[UNK]";

/// Special tokens of a built vocabulary, in id order.
const SPECIAL_TOKENS: [&str; 4] = [PAD_TOKEN, UNK_TOKEN, "[CLS]", "[SEP]"];

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load the tokenizer called `name`.
    pub fn resolve(&self, name: &str) -> Result<Tokenizer> {
        for candidate in [PathBuf::from(name), self.dir.join(name)] {
            if let Some(file) = tokenizer_file(&candidate) {
                tracing::info!("Loading tokenizer from '{}'", file.display());
                return from_file(&file);
            }
        }
        from_hub(name)
    }

    /// Load the stored tokenizer, or build one from `texts` if there is none.
    pub fn load_or_build(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        if self.dir.join(TOKENIZER_FILE).is_file() {
            tracing::info!("Loading existing tokenizer from disk");
            self.load()
        } else {
            tracing::info!("Building new tokenizer (vocab_size={})", vocab_size);
            self.build_and_save(texts, vocab_size)
        }
    }

    pub fn load(&self) -> Result<Tokenizer> {
        from_file(&self.dir.join(TOKENIZER_FILE))
    }

    fn build_and_save(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        if vocab_size <= SPECIAL_TOKENS.len() {
            return Err(DataError::Config(format!(
                "vocab_size must exceed the {} special tokens",
                SPECIAL_TOKENS.len()
            )));
        }
        fs::create_dir_all(&self.dir).map_err(|e| DataError::io(&self.dir, e))?;

        // ── Step 1: word frequencies ──────────────────────────────────────────
        let mut freq: HashMap<String, usize> = HashMap::new();
        for text in texts {
            for piece in pre_tokenize(&text.to_lowercase()) {
                *freq.entry(piece.to_string()).or_insert(0) += 1;
            }
        }

        // Most frequent first; ties alphabetical so rebuilds are identical.
        let mut words: Vec<(String, usize)> = freq.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        words.truncate(vocab_size - SPECIAL_TOKENS.len());

        // ── Step 2: vocabulary ────────────────────────────────────────────────
        let mut vocab = serde_json::Map::new();
        for (id, token) in SPECIAL_TOKENS.iter().enumerate() {
            vocab.insert(token.to_string(), serde_json::json!(id));
        }
        for (word, _) in &words {
            if !vocab.contains_key(word) {
                let id = vocab.len();
                vocab.insert(word.clone(), serde_json::json!(id));
            }
        }

        let added_tokens: Vec<serde_json::Value> = SPECIAL_TOKENS
            .iter()
            .enumerate()
            .map(|(id, token)| {
                serde_json::json!({
                    "id": id, "content": token, "single_word": false,
                    "lstrip": false, "rstrip": false, "normalized": false, "special": true
                })
            })
            .collect();

        // ── Step 3: tokenizer.json in HuggingFace format ──────────────────────
        let vocab_len = vocab.len();
        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": added_tokens,
            "normalizer": { "type": "Lowercase" },
            "pre_tokenizer": { "type": "Whitespace" },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": UNK_TOKEN
            }
        });

        let tok_path = self.dir.join(TOKENIZER_FILE);
        fs::write(&tok_path, serde_json::to_string_pretty(&tokenizer_json)?)
            .map_err(|e| DataError::io(&tok_path, e))?;

        tracing::info!(
            "Tokenizer built with {} tokens, saved to '{}'",
            vocab_len,
            tok_path.display()
        );
        from_file(&tok_path)
    }
}

/// `path` itself if it is a file, or its tokenizer.json if it is a directory.
fn tokenizer_file(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        Some(path.to_path_buf())
    } else if path.join(TOKENIZER_FILE).is_file() {
        Some(path.join(TOKENIZER_FILE))
    } else {
        None
    }
}

fn from_file(path: &Path) -> Result<Tokenizer> {
    Tokenizer::from_file(path).map_err(|e| {
        DataError::Tokenizer(format!("cannot load tokenizer from '{}': {}", path.display(), e))
    })
}

#[cfg(feature = "hub")]
fn from_hub(name: &str) -> Result<Tokenizer> {
    tracing::info!("Fetching tokenizer '{}' from the hub", name);
    Tokenizer::from_pretrained(name, None)
        .map_err(|e| DataError::Tokenizer(format!("cannot fetch tokenizer '{}': {}", name, e)))
}

#[cfg(not(feature = "hub"))]
fn from_hub(name: &str) -> Result<Tokenizer> {
    Err(DataError::NotFound {
        path: PathBuf::from(name),
    })
}

/// Split like the `Whitespace` pre-tokenizer: runs of word characters,
/// and runs of other non-space characters.
fn pre_tokenize(text: &str) -> Vec<&str> {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let mut pieces = Vec::new();
    // Byte offset where the current piece starts, and whether it is a word run
    let mut current: Option<(usize, bool)> = None;

    for (i, c) in text.char_indices() {
        let kind = if c.is_whitespace() { None } else { Some(is_word(c)) };
        match current {
            Some((_, word)) if kind == Some(word) => {}
            Some((start, _)) => {
                pieces.push(&text[start..i]);
                current = kind.map(|k| (i, k));
            }
            None => current = kind.map(|k| (i, k)),
        }
    }
    if let Some((start, _)) = current {
        pieces.push(&text[start..]);
    }
    pieces
}

// ─── HfEncoder ────────────────────────────────────────────────────────────────
/// A `tokenizers::Tokenizer` configured for fixed truncation and padding.
pub struct HfEncoder {
    tokenizer:  Tokenizer,
    max_length: usize,
    padding:    PaddingPolicy,
    pad_id:     u32,
}

impl HfEncoder {
    pub fn new(mut tokenizer: Tokenizer, max_length: usize, padding: PaddingPolicy) -> Result<Self> {
        if max_length == 0 {
            return Err(DataError::Config("max_length must be at least 1".to_string()));
        }

        // Prefer the tokenizer's own padding setup, then its [PAD] token.
        let (pad_id, pad_token) = match tokenizer.get_padding() {
            Some(p) => (p.pad_id, p.pad_token.clone()),
            None => (
                tokenizer.token_to_id(PAD_TOKEN).unwrap_or(0),
                PAD_TOKEN.to_string(),
            ),
        };

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| DataError::Tokenizer(e.to_string()))?;

        let padding_params = match padding {
            PaddingPolicy::MaxLength => Some(PaddingParams {
                strategy: PaddingStrategy::Fixed(max_length),
                pad_id,
                pad_token,
                ..Default::default()
            }),
            PaddingPolicy::Longest => None,
        };
        tokenizer.with_padding(padding_params);

        Ok(Self {
            tokenizer,
            max_length,
            padding,
            pad_id,
        })
    }
}

impl TextEncoder for HfEncoder {
    fn encode(&self, text: &str) -> Result<Encoded> {
        let enc = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| DataError::Tokenizer(e.to_string()))?;
        Ok(Encoded {
            ids:            enc.get_ids().to_vec(),
            attention_mask: enc.get_attention_mask().to_vec(),
        })
    }

    fn pad_id(&self) -> u32 {
        self.pad_id
    }

    fn max_length(&self) -> usize {
        self.max_length
    }

    fn padding(&self) -> PaddingPolicy {
        self.padding
    }
}
