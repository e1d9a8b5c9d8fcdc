//! Statement Matcher — the heart of the system.
//!
//! Assigns a contiguous, closed index range `[s, e]` in the CTM to each
//! statement piece, via a left-to-right sliding-window longest-common-
//! subsequence search over the masked reference-token stream. Once a
//! range is accepted, `speaker`/`mpid`/`lang` are written back onto every
//! CTM row in `[s, e]`.
//!
//! # Masking
//!
//! Rows whose reference token is `<eps>` or `<UNK>` are excluded from the
//! token stream the diff engine sees, but their row indices still occur
//! inside accepted ranges (and get written back to).
//!
//! # Windowing
//!
//! The masked stream is scanned in windows of `size` words with `step`
//! words of advance; within a window, a failed match attempt advances the
//! search `words_matched` words forward and retries before moving to the
//! next window. A cursor left over from the previous accepted match is
//! used as the lower bound for the next search (the monotonicity
//! guarantee), so the full stream is never rescanned from the top.

use similar::{capture_diff_slices, Algorithm, DiffOp};

use crate::ctm::types::{CtmTable, Edit};
use crate::error::{AlignError, Result};
use crate::transcript::MatchPiece;

const WINDOW_SIZE: usize = 10_000;
const WINDOW_STEP: usize = 7_500;
const MATCH_LIMIT: usize = 30;

/// Pre-computed masked view of a CTM: the subsequence of rows whose
/// reference token is neither `<eps>` nor `<UNK>`, plus a map back to the
/// absolute row index for each masked position.
struct MaskedStream<'a> {
    tokens: Vec<&'a str>,
    row_of: Vec<usize>,
}

impl<'a> MaskedStream<'a> {
    fn build(ctm: &'a CtmTable) -> Self {
        let row_of = ctm.unmasked_indices();
        let tokens = row_of.iter().map(|&i| ctm.ref_token[i].as_str()).collect();
        Self { tokens, row_of }
    }

    fn len(&self) -> usize {
        self.tokens.len()
    }
}

/// Left-to-right statement matcher over a single session's CTM.
pub struct StatementMatcher {
    /// Last accepted end position, in masked-stream coordinates; the
    /// floor for the next search.
    cursor: usize,
}

impl StatementMatcher {
    pub fn new() -> Self {
        Self { cursor: 0 }
    }

    /// Locate `piece.normalized_text` in `ctm` and write its speaker,
    /// mpid and language back onto the matched rows.
    pub fn assign(&mut self, ctm: &mut CtmTable, piece: &MatchPiece) -> Result<()> {
        let masked = MaskedStream::build(ctm);
        let text_owned: Vec<String> = piece
            .normalized_text
            .split_whitespace()
            .map(|s| s.to_string())
            .collect();
        let text: Vec<&str> = text_owned.iter().map(String::as_str).collect();
        if text.is_empty() {
            return Err(AlignError::AlignmentNotFound(
                "empty normalized text".to_string(),
            ));
        }

        let (masked_start, masked_end) =
            find_statement(&masked, ctm, self.cursor, &text, &piece.language)?;

        let (mut abs_start, mut abs_end) = (masked.row_of[masked_start], masked.row_of[masked_end]);

        if !piece.language.contains("sv") {
            let (new_start, new_end) = adjust_boundary(ctm, abs_start, abs_end)?;
            abs_start = new_start;
            abs_end = new_end;
        }

        for row in abs_start..=abs_end {
            ctm.speaker[row] = piece.speaker_name.clone();
            ctm.mpid[row] = piece.mp_id;
            ctm.lang[row] = piece.language.clone();
        }

        self.cursor = masked_end + 1;
        Ok(())
    }
}

impl Default for StatementMatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Diff-engine matching blocks, in ascending order of the old-sequence
/// position, analogous to `difflib.SequenceMatcher.get_matching_blocks()`.
#[derive(Debug, Clone, Copy)]
struct Match {
    a: usize,
    size: usize,
}

fn matching_blocks(old: &[&str], new: &[&str]) -> Vec<Match> {
    capture_diff_slices(Algorithm::Myers, old, new)
        .into_iter()
        .filter_map(|op| match op {
            DiffOp::Equal { old_index, len, .. } => Some(Match {
                a: old_index,
                size: len,
            }),
            _ => None,
        })
        .collect()
}

/// Find where `text` starts and ends in the masked stream, starting the
/// search no earlier than `floor`.
fn find_statement(
    masked: &MaskedStream,
    ctm: &CtmTable,
    floor: usize,
    text: &[&str],
    lang: &str,
) -> Result<(usize, usize)> {
    let words_matched = text.len().min(MATCH_LIMIT);
    let text_prefix = &text[..words_matched];
    let min_m = words_matched.min(5);

    let mut window_idx = 0usize;
    loop {
        let window_start = floor + window_idx * WINDOW_STEP;
        if window_start >= masked.len() {
            break;
        }
        let window_end = (window_start + WINDOW_SIZE).min(masked.len());
        let window = &masked.tokens[window_start..window_end];

        let mut start = 0usize;
        while start < WINDOW_STEP {
            let seq1 = &window[start.min(window.len())..];
            let blocks = matching_blocks(seq1, text_prefix);
            let Some(m) = blocks.into_iter().find(|m| m.size >= min_m) else {
                break;
            };
            start += m.a;
            let s = window_start + start;
            let edit_slice_end = (s + m.size).min(masked.len());
            let cor_count = (s..edit_slice_end)
                .filter(|&i| ctm.edit[masked.row_of[i]] == Edit::Cor)
                .count();
            let cor_ratio = cor_count as f64 / m.size as f64;
            if lang.contains("sv") || cor_ratio > 0.5 {
                let end = find_end_index(masked, s, text)?;
                return Ok((s, end));
            }
            start += words_matched;
        }
        window_idx += 1;
    }
    Err(AlignError::AlignmentNotFound(format!(
        "no acceptable block found for statement starting with '{}'",
        text.first().copied().unwrap_or("")
    )))
}

/// Find the last index (inclusive, masked-stream coordinates) of `text`
/// in the masked stream starting from `s`.
fn find_end_index(masked: &MaskedStream, s: usize, text: &[&str]) -> Result<usize> {
    if s >= masked.len() {
        return Err(AlignError::EndNotFound(
            "start index past end of masked stream".to_string(),
        ));
    }
    let remaining_len = masked.len() - s;
    let search_end = (text.len() + 100).min(remaining_len.saturating_sub(1));
    let hay = &masked.tokens[s..s + search_end];

    let ops = capture_diff_slices(Algorithm::Myers, hay, text);

    if let Some(DiffOp::Equal { old_index, len, .. }) = ops.last() {
        let end_local = old_index + len;
        if end_local > 0 {
            return Ok(s + end_local - 1);
        }
    }

    for op in ops.iter().rev() {
        if let DiffOp::Equal { old_index, len, .. } = op {
            if *len > 1 {
                return Ok(s + old_index + len - 1);
            }
        }
    }
    Err(AlignError::EndNotFound(
        "no trailing matching block found".to_string(),
    ))
}

/// Tighten `[start, end]` (inclusive) to the first and last `cor` rows it
/// contains. Fails with [`AlignError::ZeroLength`] when the range contains
/// no `cor` row at all.
fn adjust_boundary(ctm: &CtmTable, start: usize, end: usize) -> Result<(usize, usize)> {
    let first = (start..=end).find(|&i| ctm.edit[i] == Edit::Cor);
    let last = (start..=end).rev().find(|&i| ctm.edit[i] == Edit::Cor);
    match (first, last) {
        (Some(f), Some(l)) => Ok((f, l)),
        _ => Err(AlignError::ZeroLength),
    }
}
