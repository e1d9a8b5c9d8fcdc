//! Driver: orchestrates one session end to end (load, match, label, write,
//! tally) and fans sessions out across a thread pool, since sessions never
//! share state.

use std::path::PathBuf;

use rayon::prelude::*;

use crate::ctm::{extract_segment_info, load_ctm_edits, load_segments, load_text};
use crate::error::{AlignError, Result};
use crate::labeler::label_segments;
use crate::matcher::StatementMatcher;
use crate::recipe::Normalizer;
use crate::stats::SessionStats;
use crate::transcript::{statement_pieces, Transcript};
use crate::writer::write_outputs;

/// Everything needed to process one session: its three input tables, the
/// already-parsed transcript to match against, and the four output paths.
pub struct SessionJob {
    pub session: String,
    pub ctm_edits_path: PathBuf,
    pub segments_path: PathBuf,
    pub text_path: PathBuf,
    pub transcript: Transcript,
    pub kept_segments_path: PathBuf,
    pub dropped_segments_path: PathBuf,
    pub kept_text_path: PathBuf,
    pub dropped_text_path: PathBuf,
}

/// Run every job in `jobs` concurrently (one session never touches
/// another's state) and return each session's outcome alongside its name.
///
/// A fatal error (`InvariantViolation`/`Io`/`Serialization`) aborts only
/// the session that raised it; the rest still run to completion.
pub fn run_sessions(
    jobs: &[SessionJob],
    normalizer: &(dyn Normalizer),
) -> Vec<(String, Result<SessionStats>)> {
    jobs.par_iter()
        .map(|job| (job.session.clone(), process_session(job, normalizer)))
        .collect()
}

fn process_session(job: &SessionJob, normalizer: &dyn Normalizer) -> Result<SessionStats> {
    let mut ctm = load_ctm_edits(&job.ctm_edits_path, &job.session)?;
    let segment_info = extract_segment_info(&ctm)?;
    let mut segments = load_segments(&job.segments_path)?;
    let text = load_text(&job.text_path)?;

    if segment_info.len() != segments.len() {
        return Err(AlignError::InvariantViolation(format!(
            "session {}: segment_info has {} entries but segments has {}",
            job.session,
            segment_info.len(),
            segments.len()
        )));
    }

    let mut matcher = StatementMatcher::new();
    let mut statements = 0usize;
    let mut failed = 0usize;

    for subsection in &job.transcript.subsections {
        for statement in &subsection.statements {
            let mut normalize = |t: &str| normalizer.normalize(t);
            let pieces = match statement_pieces(statement, &mut normalize) {
                Ok(p) => p,
                Err(e) => {
                    statements += 1;
                    failed += 1;
                    log::warn!("session {}: normalization failed: {:#}", job.session, e);
                    continue;
                }
            };
            for piece in &pieces {
                statements += 1;
                match matcher.assign(&mut ctm, piece) {
                    Ok(()) => {}
                    Err(e) if !e.is_fatal() => {
                        failed += 1;
                        log::warn!("session {}: statement match failed: {}", job.session, e);
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }

    label_segments(&ctm, &segment_info, &mut segments)?;
    write_outputs(
        &segments,
        &text,
        &job.kept_segments_path,
        &job.dropped_segments_path,
        &job.kept_text_path,
        &job.dropped_text_path,
    )?;

    let mut stats = SessionStats::from_session(&job.session, &ctm, &segments);
    stats.statements = statements;
    stats.failed_statements = failed;
    log::info!(
        "session {}: {} segments, {} dropped, {}/{} statements failed",
        job.session,
        stats.segments,
        stats.dropped_segments,
        stats.failed_statements,
        stats.statements
    );
    Ok(stats)
}
