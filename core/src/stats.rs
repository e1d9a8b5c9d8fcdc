//! Per-session statistics aggregation and TSV reporting.
//!
//! Column set mirrors the postprocessing report: `length, statements,
//! failed_statements, segments, dropped_segments, failed_segments,
//! multiple_spk, swedish, segments_len, dropped_len`, plus the four
//! derived percentage columns.

use std::fmt::Write as _;

use crate::ctm::types::CtmTable;
use crate::segments::SegmentsTable;

/// Raw counters collected while processing one session; percentages are
/// derived on demand from these rather than stored, so they can never
/// drift from the counts they describe.
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    pub session: String,
    /// Total session duration, in seconds.
    pub length: f64,
    pub statements: usize,
    pub failed_statements: usize,
    pub segments: usize,
    pub dropped_segments: usize,
    /// Segments with no speaker identified at all (`mpid == 0`).
    pub failed_segments: usize,
    /// Segments with more than one real speaker (`mpid == -1`).
    pub multiple_spk: usize,
    /// Segments whose resolved language is Swedish-only.
    pub swedish: usize,
    /// Total duration of kept segments, in seconds.
    pub segments_len: f64,
    /// Total duration of dropped segments, in seconds.
    pub dropped_len: f64,
}

impl SessionStats {
    /// Tally the segment-level counters from the labeled CTM and segments
    /// table. `statements`/`failed_statements` are filled in separately by
    /// the driver, which is the only place that sees statement-level
    /// matching outcomes.
    pub fn from_session(session: &str, ctm: &CtmTable, segments: &SegmentsTable) -> Self {
        let length = ctm
            .session_start
            .last()
            .zip(ctm.word_duration.last())
            .map(|(s, d)| s + d)
            .unwrap_or(0.0);

        let mut stats = SessionStats {
            session: session.to_string(),
            length,
            ..Default::default()
        };

        for row in &segments.rows {
            let len = row.end - row.start;
            stats.segments += 1;
            if row.new_uttid.is_empty() {
                stats.dropped_segments += 1;
                stats.dropped_len += len;
            } else {
                stats.segments_len += len;
            }
            match row.mpid {
                0 => stats.failed_segments += 1,
                -1 => stats.multiple_spk += 1,
                _ => {}
            }
            if row.lang == "sv" {
                stats.swedish += 1;
            }
        }
        stats
    }

    pub fn segments_p(&self) -> f64 {
        percent(self.segments - self.dropped_segments, self.segments)
    }

    pub fn failed_p(&self) -> f64 {
        percent(self.failed_statements, self.statements)
    }

    pub fn dropped_p(&self) -> f64 {
        percent(self.dropped_segments, self.segments)
    }

    pub fn dropped_p_len(&self) -> f64 {
        if self.length <= 0.0 {
            0.0
        } else {
            100.0 * self.dropped_len / self.length
        }
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

pub const STATS_COLUMNS: &[&str] = &[
    "session",
    "length",
    "statements",
    "failed_statements",
    "segments",
    "dropped_segments",
    "failed_segments",
    "multiple_spk",
    "swedish",
    "segments_len",
    "dropped_len",
    "segments_p",
    "failed_p",
    "dropped_p",
    "dropped_p_len",
];

/// Render per-session statistics as a tab-separated table, header first.
pub fn report_statistics(stats: &[SessionStats]) -> String {
    let mut out = String::new();
    writeln!(out, "{}", STATS_COLUMNS.join("\t")).unwrap();
    for s in stats {
        writeln!(
            out,
            "{}\t{:.0}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.0}\t{:.0}\t{:.2}\t{:.2}\t{:.2}\t{:.2}",
            s.session,
            s.length,
            s.statements,
            s.failed_statements,
            s.segments,
            s.dropped_segments,
            s.failed_segments,
            s.multiple_spk,
            s.swedish,
            s.segments_len,
            s.dropped_len,
            s.segments_p(),
            s.failed_p(),
            s.dropped_p(),
            s.dropped_p_len(),
        )
        .unwrap();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctm::types::{CtmRow, Edit};
    use crate::segments::SegmentRow;

    fn segment(new_uttid: &str, mpid: i32, lang: &str, start: f64, end: f64) -> SegmentRow {
        SegmentRow {
            uttid: "u".into(),
            recordid: "session-001-2015".into(),
            start,
            end,
            seg_start: 0.0,
            seg_end: 10.0,
            seg_id: 0,
            mpid,
            lang: lang.into(),
            new_uttid: new_uttid.into(),
        }
    }

    fn ctm_with_duration(total_seconds: f64) -> CtmTable {
        let mut ctm = CtmTable::with_capacity("s", 1);
        ctm.push(CtmRow {
            word_start: 0.0,
            word_duration: total_seconds,
            asr_token: "a".into(),
            ref_token: "a".into(),
            edit: Edit::Cor,
            segment_info: String::new(),
            seg_start: 0.0,
            seg_end: 0.0,
            word_id: 0,
            session_start: 0.0,
            speaker: "unknown".into(),
            mpid: 0,
            lang: String::new(),
        });
        ctm
    }

    #[test]
    fn derives_percentages_from_counts() {
        let ctm = ctm_with_duration(3.0);
        let mut segments = SegmentsTable::default();
        segments.push(segment("01301-session-001-2015-00000000-00000100", 1301, "fi", 0.0, 1.0));
        segments.push(segment("", -1, "fi", 1.0, 2.0));
        segments.push(segment("", 0, "", 2.0, 2.5));

        let mut stats = SessionStats::from_session("001-2015", &ctm, &segments);
        stats.statements = 4;
        stats.failed_statements = 1;

        assert_eq!(stats.segments, 3);
        assert_eq!(stats.dropped_segments, 2);
        assert_eq!(stats.multiple_spk, 1);
        assert_eq!(stats.failed_segments, 1);
        assert!((stats.segments_p() - 33.333).abs() < 0.01);
        assert!((stats.failed_p() - 25.0).abs() < 1e-9);
        assert!((stats.dropped_p() - 66.666).abs() < 0.01);
    }

    #[test]
    fn empty_session_has_zero_percentages_not_nan() {
        let ctm = CtmTable::with_capacity("s", 0);
        let segments = SegmentsTable::default();
        let stats = SessionStats::from_session("001-2015", &ctm, &segments);
        assert_eq!(stats.segments_p(), 0.0);
        assert_eq!(stats.dropped_p_len(), 0.0);
    }

    #[test]
    fn report_includes_header_and_one_row_per_session() {
        let ctm = ctm_with_duration(10.0);
        let mut segments = SegmentsTable::default();
        segments.push(segment("01301-session-001-2015-00000000-00000500", 1301, "fi", 0.0, 5.0));
        segments.push(segment("", -1, "fi", 5.0, 10.0));
        let stats = vec![SessionStats::from_session("001-2015", &ctm, &segments)];

        let report = report_statistics(&stats);
        let mut lines = report.lines();
        assert_eq!(lines.next().unwrap(), STATS_COLUMNS.join("\t"));
        assert!(lines.next().unwrap().starts_with("001-2015\t"));
    }
}
