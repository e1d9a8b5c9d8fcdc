//! Property tests for the structural invariants the core relies on:
//! uttid round-tripping, masking, and the segment/labeler length and
//! kept-vs-dropped agreements.

use proptest::prelude::*;

use parliament_align::ctm::segment_info::SegmentInfo;
use parliament_align::ctm::types::{CtmRow, CtmTable, Edit};
use parliament_align::labeler::label_segments;
use parliament_align::segments::{SegmentRow, SegmentsTable};
use parliament_align::uttid::{format_uttid, parse_new_uttid};

fn blank_row(mpid: i32) -> CtmRow {
    CtmRow {
        word_start: 0.0,
        word_duration: 0.1,
        asr_token: "a".into(),
        ref_token: "a".into(),
        edit: Edit::Cor,
        segment_info: String::new(),
        seg_start: 0.0,
        seg_end: 0.0,
        word_id: 0,
        session_start: 0.0,
        speaker: "unknown".into(),
        mpid,
        lang: "fi".into(),
    }
}

fn blank_segment() -> SegmentRow {
    SegmentRow {
        uttid: "u".into(),
        recordid: "session-001-2015".into(),
        start: 0.0,
        end: 1.0,
        seg_start: 0.0,
        seg_end: 10.0,
        seg_id: 0,
        mpid: 0,
        lang: String::new(),
        new_uttid: String::new(),
    }
}

proptest! {
    /// Formatting then parsing a new uttid recovers the same mpid, session
    /// and timestamps, up to the centisecond quantization the format uses.
    #[test]
    fn uttid_round_trips_within_quantization(
        mpid in 1i32..99_999,
        start_cs in 0i64..10_000_000,
        len_cs in 1i64..1_000_000,
    ) {
        let session = "session-042-2018";
        let start = start_cs as f64 / 100.0;
        let end = (start_cs + len_cs) as f64 / 100.0;

        let uttid = format_uttid(mpid, session, start, end);
        let (parsed_mpid, parsed_session, parsed_start, parsed_end) =
            parse_new_uttid(&uttid).expect("a formatted uttid must parse back");

        prop_assert_eq!(parsed_mpid, mpid);
        prop_assert_eq!(parsed_session, session);
        prop_assert!((parsed_start - start).abs() < 0.01);
        prop_assert!((parsed_end - end).abs() < 0.01);
    }

    /// No index returned by `unmasked_indices` ever points at an `<eps>` or
    /// `<UNK>` reference token, whatever the token stream looks like.
    #[test]
    fn masked_indices_never_include_eps_or_unk(
        tokens in prop::collection::vec(
            prop::sample::select(vec!["alpha", "beta", "<eps>", "<UNK>", "gamma"]),
            0..50,
        )
    ) {
        let mut ctm = CtmTable::with_capacity("s", tokens.len());
        for t in &tokens {
            let mut row = blank_row(0);
            row.asr_token = t.to_string();
            row.ref_token = t.to_string();
            ctm.push(row);
        }
        for i in ctm.unmasked_indices() {
            prop_assert_ne!(ctm.ref_token[i].as_str(), "<eps>");
            prop_assert_ne!(ctm.ref_token[i].as_str(), "<UNK>");
        }
    }

    /// The labeler refuses to run when the segment-info and segments
    /// tables disagree on row count; they must be joined positionally from
    /// equal-length tables.
    #[test]
    fn labeler_rejects_mismatched_table_lengths(n_info in 0usize..5, n_segments in 0usize..5) {
        prop_assume!(n_info != n_segments);

        let ctm = CtmTable::with_capacity("s", 0);
        let infos: Vec<SegmentInfo> = (0..n_info)
            .map(|i| SegmentInfo {
                row_index: 0,
                seg_num: i as i64,
                seg_start_idx: 0,
                seg_end_idx: 0,
                word_id: 0,
            })
            .collect();
        let mut segments = SegmentsTable::default();
        for _ in 0..n_segments {
            segments.push(blank_segment());
        }

        prop_assert!(label_segments(&ctm, &infos, &mut segments).is_err());
    }

    /// A labeled segment carries a non-empty rewritten uttid exactly when
    /// its resolved mpid is positive (a single confidently identified
    /// speaker); `0` (nobody) and `-1` (more than one speaker) are always
    /// dropped.
    #[test]
    fn kept_status_matches_resolved_mpid_sign(
        mpids in prop::collection::vec(0i32..5, 1..10)
    ) {
        let mut ctm = CtmTable::with_capacity("s", mpids.len());
        for &m in &mpids {
            ctm.push(blank_row(m));
        }
        let infos = vec![SegmentInfo {
            row_index: 0,
            seg_num: 0,
            seg_start_idx: 0,
            seg_end_idx: mpids.len() as i64,
            word_id: 0,
        }];
        let mut segments = SegmentsTable::default();
        segments.push(blank_segment());

        label_segments(&ctm, &infos, &mut segments).unwrap();

        let row = &segments.rows[0];
        prop_assert_eq!(row.mpid > 0, !row.new_uttid.is_empty());
    }

    /// A lone real speaker among a block of unlabeled (`mpid == 0`) rows
    /// wins only while fewer than two such zero rows are present; two or
    /// more make the speaker ambiguous (`-1`), per the documented gate.
    /// This exercises the exact scenario the sign-only check above cannot:
    /// the resolved mpid value itself, not merely whether it is positive.
    #[test]
    fn speaker_gate_tolerates_at_most_one_zero_mpid_gap_row(
        real_mpid in 1i32..50,
        real_rows in 2usize..5,
        zero_rows in 0usize..4,
    ) {
        let mut mpids = vec![real_mpid; real_rows];
        mpids.extend(std::iter::repeat(0).take(zero_rows));

        let mut ctm = CtmTable::with_capacity("s", mpids.len());
        for &m in &mpids {
            ctm.push(blank_row(m));
        }
        let infos = vec![SegmentInfo {
            row_index: 0,
            seg_num: 0,
            seg_start_idx: 0,
            seg_end_idx: mpids.len() as i64,
            word_id: 0,
        }];
        let mut segments = SegmentsTable::default();
        segments.push(blank_segment());

        label_segments(&ctm, &infos, &mut segments).unwrap();

        let expected = if zero_rows < 2 { real_mpid } else { -1 };
        prop_assert_eq!(segments.rows[0].mpid, expected);
    }

    /// Language resolution checks `"fi"` and `"sv"` substring membership
    /// independently across the whole slice, not as exclusive branches of
    /// one row: a row already tagged `"fi+sv"` must contribute to both.
    #[test]
    fn language_resolution_is_independent_fi_and_sv_membership(
        tags in prop::collection::vec(
            prop::sample::select(vec!["fi", "sv", "fi+sv", ""]),
            1..6,
        )
    ) {
        let mut ctm = CtmTable::with_capacity("s", tags.len());
        for t in &tags {
            let mut row = blank_row(7);
            row.lang = t.to_string();
            ctm.push(row);
        }
        let infos = vec![SegmentInfo {
            row_index: 0,
            seg_num: 0,
            seg_start_idx: 0,
            seg_end_idx: tags.len() as i64,
            word_id: 0,
        }];
        let mut segments = SegmentsTable::default();
        segments.push(blank_segment());

        label_segments(&ctm, &infos, &mut segments).unwrap();

        let has_fi = tags.iter().any(|t| t.contains("fi"));
        let has_sv = tags.iter().any(|t| t.contains("sv"));
        let expected = match (has_fi, has_sv) {
            (true, true) => "fi+sv",
            (false, true) => "sv",
            _ => "fi",
        };
        prop_assert_eq!(segments.rows[0].lang.as_str(), expected);
    }
}
