//! Row-level types for the edit-segmented CTM.

use std::fmt;
use std::str::FromStr;

use crate::error::AlignError;

/// Alignment epsilon: no ASR hypothesis word corresponds to this position.
pub const EPS: &str = "<eps>";
/// Unknown reference word.
pub const UNK: &str = "<UNK>";

/// Per-word edit label from the Kaldi-style forced alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edit {
    /// Correct: ASR hypothesis matches the reference.
    Cor,
    /// Substitution.
    Sub,
    /// Insertion (ASR hypothesized a word absent from the reference).
    Ins,
    /// Deletion (reference word missing from the ASR hypothesis).
    Del,
    /// Silence.
    Sil,
    /// Filler correction.
    Fix,
}

impl Edit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Edit::Cor => "cor",
            Edit::Sub => "sub",
            Edit::Ins => "ins",
            Edit::Del => "del",
            Edit::Sil => "sil",
            Edit::Fix => "fix",
        }
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Edit {
    type Err = AlignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cor" => Ok(Edit::Cor),
            "sub" => Ok(Edit::Sub),
            "ins" => Ok(Edit::Ins),
            "del" => Ok(Edit::Del),
            "sil" => Ok(Edit::Sil),
            "fix" => Ok(Edit::Fix),
            other => Err(AlignError::InvariantViolation(format!(
                "unknown edit label '{other}'"
            ))),
        }
    }
}

/// One row of the `.ctm_edits.segmented` file, plus the columns the core
/// adds during matching and labeling.
#[derive(Debug, Clone)]
pub struct CtmRow {
    pub word_start: f64,
    pub word_duration: f64,
    pub asr_token: String,
    pub ref_token: String,
    pub edit: Edit,
    pub segment_info: String,
    pub seg_start: f64,
    pub seg_end: f64,
    pub word_id: i64,
    pub session_start: f64,

    /// Added by the matcher; `"unknown"` until a statement's range covers
    /// this row.
    pub speaker: String,
    /// Added by the matcher; `0` until assigned.
    pub mpid: i32,
    /// Added by the matcher; `""` until assigned.
    pub lang: String,
}

impl CtmRow {
    /// Whether this row is masked out of fuzzy-matching streams: rows
    /// whose reference token is an alignment epsilon or unknown word still
    /// occupy a slot in any returned index range, but never count toward
    /// match quality.
    pub fn is_masked_out(&self) -> bool {
        self.ref_token == EPS || self.ref_token == UNK
    }
}

/// The in-memory alignment CTM, stored column-major.
///
/// The matcher and labeler repeatedly scan `ref_token`, `edit`, `mpid` and
/// `lang`; keeping those contiguous avoids chasing pointers through a
/// `Vec<CtmRow>` on every pass, the dataframe attribute bag of the source
/// implementation becomes the explicit `session` field here.
#[derive(Debug, Default)]
pub struct CtmTable {
    pub session: String,
    pub word_start: Vec<f64>,
    pub word_duration: Vec<f64>,
    pub asr_token: Vec<String>,
    pub ref_token: Vec<String>,
    pub edit: Vec<Edit>,
    pub segment_info: Vec<String>,
    pub seg_start: Vec<f64>,
    pub seg_end: Vec<f64>,
    pub word_id: Vec<i64>,
    pub session_start: Vec<f64>,
    pub speaker: Vec<String>,
    pub mpid: Vec<i32>,
    pub lang: Vec<String>,
}

impl CtmTable {
    pub fn with_capacity(session: impl Into<String>, cap: usize) -> Self {
        Self {
            session: session.into(),
            word_start: Vec::with_capacity(cap),
            word_duration: Vec::with_capacity(cap),
            asr_token: Vec::with_capacity(cap),
            ref_token: Vec::with_capacity(cap),
            edit: Vec::with_capacity(cap),
            segment_info: Vec::with_capacity(cap),
            seg_start: Vec::with_capacity(cap),
            seg_end: Vec::with_capacity(cap),
            word_id: Vec::with_capacity(cap),
            session_start: Vec::with_capacity(cap),
            speaker: Vec::with_capacity(cap),
            mpid: Vec::with_capacity(cap),
            lang: Vec::with_capacity(cap),
        }
    }

    pub fn len(&self) -> usize {
        self.ref_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push(&mut self, row: CtmRow) {
        self.word_start.push(row.word_start);
        self.word_duration.push(row.word_duration);
        self.asr_token.push(row.asr_token);
        self.ref_token.push(row.ref_token);
        self.edit.push(row.edit);
        self.segment_info.push(row.segment_info);
        self.seg_start.push(row.seg_start);
        self.seg_end.push(row.seg_end);
        self.word_id.push(row.word_id);
        self.session_start.push(row.session_start);
        self.speaker.push(row.speaker);
        self.mpid.push(row.mpid);
        self.lang.push(row.lang);
    }

    /// Indices of rows whose reference token is neither `<eps>` nor
    /// `<UNK>` — the "masked stream" the matcher searches over.
    pub fn unmasked_indices(&self) -> Vec<usize> {
        (0..self.len())
            .filter(|&i| self.ref_token[i] != EPS && self.ref_token[i] != UNK)
            .collect()
    }
}
