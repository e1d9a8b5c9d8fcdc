//! The pluggable text normalizer.
//!
//! Text normalization recipes (regex rewrites, character filtering,
//! translation tables) are an external collaborator: this crate only ever
//! calls `normalize(text) -> text` through the [`Normalizer`] trait. A
//! concrete recipe (its `REGEXPS`/`UNACCEPTED_CHARS`/`TRANSLATIONS` tables)
//! is injected at driver construction and is opaque to everything below it.

use anyhow::Result;

/// A deterministic, idempotent text rewrite pipeline.
///
/// Implementations are expected to lowercase and whitespace-normalize their
/// input; beyond that the exact rewrite rules are a recipe-specific detail
/// the core never inspects.
pub trait Normalizer: Send + Sync {
    fn normalize(&self, text: &str) -> Result<String>;
}

/// A minimal built-in normalizer: lowercases and collapses runs of
/// whitespace. Useful as a default and in tests; production recipes are
/// expected to additionally strip punctuation and apply locale-specific
/// translation tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceNormalizer;

impl Normalizer for WhitespaceNormalizer {
    fn normalize(&self, text: &str) -> Result<String> {
        Ok(text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase())
    }
}
