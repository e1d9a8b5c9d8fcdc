//! Alignment loader: parses the three co-located tabular files for a
//! session into typed in-memory tables and validates their invariants.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::ctm::types::{CtmRow, CtmTable, Edit};
use crate::error::{AlignError, Result};
use crate::segments::{SegmentRow, SegmentsTable, TextRow, TextTable};
use crate::uttid::split_segment_id;

/// Parse a `.ctm_edits.segmented` file into a [`CtmTable`], checking the
/// segment-continuity invariant along the way.
///
/// Fields after the 8th column are joined with single spaces into
/// `segment_info`; `channel` and `prob` are read but discarded.
pub fn load_ctm_edits(path: &Path, session: &str) -> Result<CtmTable> {
    let contents = fs::read_to_string(path)?;
    let line_count = contents.lines().filter(|l| !l.trim().is_empty()).count();
    let mut table = CtmTable::with_capacity(session, line_count);

    for (lineno, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 8 {
            return Err(AlignError::InvariantViolation(format!(
                "{}:{}: expected at least 8 columns, found {}",
                path.display(),
                lineno + 1,
                fields.len()
            )));
        }
        let uttid = fields[0];
        let word_start: f64 = fields[2].parse().map_err(|_| {
            AlignError::InvariantViolation(format!("{}:{}: bad word_start", path.display(), lineno + 1))
        })?;
        let word_duration: f64 = fields[3].parse().map_err(|_| {
            AlignError::InvariantViolation(format!(
                "{}:{}: bad word_duration",
                path.display(),
                lineno + 1
            ))
        })?;
        let asr_token = fields[4].to_string();
        let ref_token = fields[6].to_string();
        let edit: Edit = fields[7].parse()?;
        let segment_info = fields[8..].join(" ");

        let (seg_start, seg_end, word_id) = split_segment_id(uttid)?;

        table.push(CtmRow {
            word_start,
            word_duration,
            asr_token,
            ref_token,
            edit,
            segment_info,
            seg_start,
            seg_end,
            word_id,
            session_start: seg_start + word_start,
            speaker: "unknown".to_string(),
            mpid: 0,
            lang: String::new(),
        });
    }

    check_segment_continuity(&table)?;
    Ok(table)
}

/// Verify that the first segment begins at zero and that consecutive
/// `seg_start` differences take at most two distinct values, one of which
/// is zero (rows within the same segment repeat 0.0, adjacent segments
/// repeat the fixed segment length).
fn check_segment_continuity(table: &CtmTable) -> Result<()> {
    if table.is_empty() {
        return Err(AlignError::InvariantViolation("empty CTM".to_string()));
    }
    if table.seg_start[0] != 0.0 {
        return Err(AlignError::InvariantViolation(
            "first segment is missing (seg_start[0] != 0.0)".to_string(),
        ));
    }
    let mut diffs: HashSet<u64> = HashSet::new();
    let mut prev = 0.0f64;
    for &s in &table.seg_start {
        diffs.insert((s - prev).to_bits());
        prev = s;
    }
    let has_zero = diffs.contains(&0.0f64.to_bits());
    if diffs.len() > 2 || !has_zero {
        return Err(AlignError::InvariantViolation(
            "there is a missing segment".to_string(),
        ));
    }
    Ok(())
}

/// Parse a `.segments` file: `<uttid> <recordid> <start> <end>` per line.
pub fn load_segments(path: &Path) -> Result<SegmentsTable> {
    let contents = fs::read_to_string(path)?;
    let mut table = SegmentsTable::default();
    for (lineno, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 4 {
            return Err(AlignError::InvariantViolation(format!(
                "{}:{}: expected 4 columns, found {}",
                path.display(),
                lineno + 1,
                fields.len()
            )));
        }
        let uttid = fields[0].to_string();
        let recordid = fields[1].to_string();
        let start: f64 = fields[2]
            .parse()
            .map_err(|_| AlignError::InvariantViolation(format!("{}:{}: bad start", path.display(), lineno + 1)))?;
        let end: f64 = fields[3]
            .parse()
            .map_err(|_| AlignError::InvariantViolation(format!("{}:{}: bad end", path.display(), lineno + 1)))?;
        let (seg_start, seg_end, seg_id) = split_segment_id(&uttid)?;
        table.push(SegmentRow {
            uttid,
            recordid,
            start: start + seg_start,
            end: end + seg_start,
            seg_start,
            seg_end,
            seg_id,
            mpid: 0,
            lang: String::new(),
            new_uttid: String::new(),
        });
    }
    Ok(table)
}

/// Parse a `.text` file: `<uttid> <free-form sentence>` per line.
pub fn load_text(path: &Path) -> Result<TextTable> {
    let contents = fs::read_to_string(path)?;
    let mut table = TextTable::default();
    for line in contents.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let (uttid, text) = line.split_once(' ').unwrap_or((line, ""));
        table.push(TextRow {
            uttid: uttid.to_string(),
            text: text.to_string(),
            mpid: 0,
            lang: String::new(),
            new_uttid: String::new(),
        });
    }
    Ok(table)
}
