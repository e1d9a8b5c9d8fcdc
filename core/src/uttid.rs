//! Parsing and formatting of the `session-NNN-YYYY-START-END[WORDID]` family
//! of utterance/segment identifiers used throughout the Kaldi tables.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::AlignError;

static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<prefix>.+)-(?P<start>\d+)-(?P<end>\d+)\[(?P<id>\d+)\]$").unwrap());
static TRAILING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<prefix>.+)-(?P<start>\d+)-(?P<end>\d+)-(?P<id>\d+)$").unwrap());

/// Split a segment/utterance id into `(seg_start, seg_end, seg_id)` seconds
/// and a running number.
///
/// Accepts both the bracketed form `session-NNN-YYYY-START-END[ID]` and the
/// trailing-hyphen form `session-NNN-YYYY-START-END-ID`. `START`/`END` are
/// centiseconds; dividing by 100 yields seconds.
pub fn split_segment_id(id: &str) -> Result<(f64, f64, i64), AlignError> {
    if let Some(caps) = BRACKETED.captures(id) {
        let start: f64 = caps["start"].parse().unwrap();
        let end: f64 = caps["end"].parse().unwrap();
        let seg_id: i64 = caps["id"].parse().unwrap();
        return Ok((start / 100.0, end / 100.0, seg_id));
    }
    if let Some(caps) = TRAILING.captures(id) {
        let start: f64 = caps["start"].parse().unwrap();
        let end: f64 = caps["end"].parse().unwrap();
        let seg_id: i64 = caps["id"].parse().unwrap();
        return Ok((start / 100.0, end / 100.0, seg_id));
    }
    Err(AlignError::InvariantViolation(format!(
        "segment id '{id}' does not match the session-NNN-YYYY-START-END[ID] family"
    )))
}

/// Format a new utterance id, bit-exact with the spec: `{mpid:05}-session-{start_cs:08}-{end_cs:08}`.
///
/// `session` is expected to already be of the form `session-NNN-YYYY`.
pub fn format_uttid(mpid: i32, session: &str, start_seconds: f64, end_seconds: f64) -> String {
    let start_cs = (start_seconds * 100.0).round() as i64;
    let end_cs = (end_seconds * 100.0).round() as i64;
    format!("{mpid:05}-{session}-{start_cs:08}-{end_cs:08}")
}

static NEW_UTTID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<mpid>\d{5})-(?P<session>session-\d+-\d+)-(?P<start>\d+)-(?P<end>\d+)$")
        .unwrap()
});

/// Parse an emitted uttid back into `(mpid, session, start_seconds, end_seconds)`.
///
/// The inverse of [`format_uttid`], modulo the 10ms rounding applied when
/// forming the centisecond fields.
pub fn parse_new_uttid(uttid: &str) -> Option<(i32, String, f64, f64)> {
    let caps = NEW_UTTID.captures(uttid)?;
    let mpid: i32 = caps["mpid"].parse().ok()?;
    let session = caps["session"].to_string();
    let start: i64 = caps["start"].parse().ok()?;
    let end: i64 = caps["end"].parse().ok()?;
    Some((mpid, session, start as f64 / 100.0, end as f64 / 100.0))
}
