//! Structured session transcript consumed by the matcher.

pub mod types;

pub use types::{statement_pieces, EmbeddedStatement, MatchPiece, Statement, Subsection, Transcript};
