//! Segment-Info Extractor: pulls `(segment_number, word_start_index,
//! word_end_index)` markers embedded in CTM rows.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ctm::types::CtmTable;
use crate::error::{AlignError, Result};

static SEGMENT_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"start-segment-(\d+)\[start=(\d+),end=(\d+)").unwrap());

/// One parsed `segment_info` marker, tied back to the CTM row it came from.
#[derive(Debug, Clone, Copy)]
pub struct SegmentInfo {
    pub row_index: usize,
    pub seg_num: i64,
    pub seg_start_idx: i64,
    pub seg_end_idx: i64,
    pub word_id: i64,
}

/// Extract every `start-segment-<n>[start=<i>,end=<j>` marker from the CTM,
/// in row order.
///
/// The count of extracted markers must equal the number of rows in the
/// segments table; the caller enforces that (a mismatch is fatal for the
/// session, see `SPEC_FULL.md` §Alignment Loader).
pub fn extract_segment_info(ctm: &CtmTable) -> Result<Vec<SegmentInfo>> {
    let mut out = Vec::new();
    for (row_index, info) in ctm.segment_info.iter().enumerate() {
        let Some(caps) = SEGMENT_MARKER.captures(info) else {
            continue;
        };
        let seg_num: i64 = caps[1].parse().map_err(|_| {
            AlignError::InvariantViolation(format!("malformed segment marker '{info}'"))
        })?;
        let seg_start_idx: i64 = caps[2].parse().unwrap();
        let seg_end_idx: i64 = caps[3].parse().unwrap();
        out.push(SegmentInfo {
            row_index,
            seg_num,
            seg_start_idx,
            seg_end_idx,
            word_id: ctm.word_id[row_index],
        });
    }
    Ok(out)
}
