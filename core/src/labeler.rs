//! Segment Labeler: resolves one speaker and language per transcribed
//! segment from the per-word labels the matcher wrote onto the CTM, and
//! forms each segment's rewritten utterance id.

use std::collections::HashSet;

use crate::ctm::segment_info::SegmentInfo;
use crate::ctm::types::{CtmTable, Edit};
use crate::error::{AlignError, Result};
use crate::segments::SegmentsTable;
use crate::uttid::format_uttid;

/// Resolve every segment's speaker, language and new utterance id in place.
///
/// `segment_info` and `segments` are joined positionally; their lengths
/// must already have been checked equal by the caller (a mismatch there is
/// an [`AlignError::InvariantViolation`], not something this function can
/// recover from on its own).
pub fn label_segments(
    ctm: &CtmTable,
    segment_info: &[SegmentInfo],
    segments: &mut SegmentsTable,
) -> Result<()> {
    if segment_info.len() != segments.len() {
        return Err(AlignError::InvariantViolation(format!(
            "segment_info has {} entries but segments has {}",
            segment_info.len(),
            segments.len()
        )));
    }

    for (info, segment) in segment_info.iter().zip(segments.rows.iter_mut()) {
        let shift = info.seg_start_idx - info.word_id;
        let length = (info.seg_end_idx - info.seg_start_idx).max(0) as usize;
        let start = (info.row_index as i64 + shift).max(0) as usize;
        let start = start.min(ctm.len());
        let end = (start + length).min(ctm.len());

        let mpid = resolve_speaker(ctm, start, end);
        let lang = resolve_language(ctm, start, end);

        segment.mpid = mpid;
        segment.lang = lang;
        segment.new_uttid = if mpid > 0 && segment.lang == "fi" {
            format_uttid(mpid, &segment.recordid, segment.start, segment.end)
        } else {
            String::new()
        };
    }
    Ok(())
}

/// Resolve the speaker mp_id for rows `[start, end)`, ignoring `sil`/`fix`
/// edits. A single distinct value wins outright (including `0`, when no row
/// carries a real speaker). A lone nonzero value alongside `mpid == 0` rows
/// only wins if fewer than two such zero rows are present, tolerating a
/// sporadic gap; two or more zero rows, or more than one distinct nonzero
/// speaker, yields `-1`.
fn resolve_speaker(ctm: &CtmTable, start: usize, end: usize) -> i32 {
    let mut distinct: HashSet<i32> = HashSet::new();
    let mut zero_count = 0usize;
    for i in start..end {
        if matches!(ctm.edit[i], Edit::Sil | Edit::Fix) {
            continue;
        }
        let mpid = ctm.mpid[i];
        distinct.insert(mpid);
        if mpid == 0 {
            zero_count += 1;
        }
    }
    match distinct.len() {
        0 => 0,
        1 => *distinct.iter().next().unwrap(),
        2 if distinct.contains(&0) && zero_count < 2 => {
            *distinct.iter().find(|&&v| v != 0).unwrap()
        }
        _ => -1,
    }
}

/// Resolve the segment's language tag: `"fi+sv"` when both languages are
/// present among its labeled rows, `"sv"` when only Swedish is, and `"fi"`
/// by default (including when no row carries a language at all).
///
/// `has_fi`/`has_sv` are independent substring checks over every row in
/// range, not mutually exclusive branches of the same row: a single row
/// already tagged `"fi+sv"` (a valid statement language) must set both.
fn resolve_language(ctm: &CtmTable, start: usize, end: usize) -> String {
    let mut has_fi = false;
    let mut has_sv = false;
    for i in start..end {
        if matches!(ctm.edit[i], Edit::Sil | Edit::Fix) {
            continue;
        }
        let lang = ctm.lang[i].as_str();
        if lang.contains("fi") {
            has_fi = true;
        }
        if lang.contains("sv") {
            has_sv = true;
        }
    }
    match (has_fi, has_sv) {
        (true, true) => "fi+sv".to_string(),
        (false, true) => "sv".to_string(),
        _ => "fi".to_string(),
    }
}
