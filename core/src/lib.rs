//! Aligns parliamentary plenary transcripts with the word-level forced
//! alignment ("CTM") produced by an ASR pipeline, assigning a speaker and
//! language to every transcribed segment.
//!
//! The pipeline per session is: load the three co-located tables
//! ([`ctm`]), extract segment markers, match each transcript statement
//! into the CTM ([`matcher`]), resolve per-segment speaker/language
//! ([`labeler`]), write the labeled output ([`writer`]) and report
//! [`stats`]. [`driver`] ties these together across however many sessions
//! are being processed.

pub mod ctm;
pub mod driver;
pub mod error;
pub mod labeler;
pub mod matcher;
pub mod recipe;
pub mod segments;
pub mod stats;
pub mod transcript;
pub mod uttid;

pub use error::{AlignError, Result};
