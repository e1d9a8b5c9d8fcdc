//! `parliament-align postprocess <ctms-list-file> <recipe-file>`
//!
//! Reads a list of session names, locates each session's CTM/segments/text
//! tables and parsed transcript alongside the list file, matches
//! statements into the alignment, labels segments, writes the kept/dropped
//! outputs, and prints a TSV statistics report to stdout.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use parliament_align::driver::{run_sessions, SessionJob};
use parliament_align::recipe::WhitespaceNormalizer;
use parliament_align::stats::report_statistics;
use parliament_align::transcript::Transcript;

#[derive(Parser)]
#[command(
    name = "parliament-align",
    about = "Align plenary transcripts against ASR forced-alignment output"
)]
struct Cli {
    /// File listing one session name per line.
    ctms_list_file: PathBuf,
    /// Text-normalization recipe to apply before matching.
    recipe_file: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let jobs = match build_jobs(&cli.ctms_list_file) {
        Ok(jobs) => jobs,
        Err(e) => {
            log::error!("failed to build session jobs: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    // Recipe-specific rewrite rules (regexes, translation tables) are an
    // external collaborator; only the built-in whitespace/lowercase
    // normalizer ships here, see DESIGN.md.
    if let Err(e) = fs::metadata(&cli.recipe_file) {
        log::warn!(
            "recipe file {} unreadable ({e}), falling back to the default normalizer",
            cli.recipe_file.display()
        );
    }
    let normalizer = WhitespaceNormalizer;

    let results = run_sessions(&jobs, &normalizer);

    let mut stats = Vec::new();
    let mut any_fatal = false;
    for (session, outcome) in results {
        match outcome {
            Ok(s) => stats.push(s),
            Err(e) => {
                log::error!("session {session} aborted: {e}");
                any_fatal = true;
            }
        }
    }

    print!("{}", report_statistics(&stats));

    if any_fatal {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Build one [`SessionJob`] per non-blank line of `ctms_list_file`. Each
/// session `<name>` is expected to have `<name>.ctm_edits.segmented`,
/// `<name>.segments`, `<name>.text` and `<name>.transcript.json` alongside
/// the list file.
fn build_jobs(ctms_list_file: &Path) -> anyhow::Result<Vec<SessionJob>> {
    let dir = ctms_list_file.parent().unwrap_or_else(|| Path::new("."));
    let contents = fs::read_to_string(ctms_list_file)?;
    let mut jobs = Vec::new();
    for line in contents.lines() {
        let session = line.trim();
        if session.is_empty() {
            continue;
        }
        let transcript_path = dir.join(format!("{session}.transcript.json"));
        let transcript: Transcript = serde_json::from_str(&fs::read_to_string(&transcript_path)?)?;
        jobs.push(SessionJob {
            session: session.to_string(),
            ctm_edits_path: dir.join(format!("{session}.ctm_edits.segmented")),
            segments_path: dir.join(format!("{session}.segments")),
            text_path: dir.join(format!("{session}.text")),
            transcript,
            kept_segments_path: dir.join(format!("{session}.segments.kept")),
            dropped_segments_path: dir.join(format!("{session}.segments.dropped")),
            kept_text_path: dir.join(format!("{session}.text.kept")),
            dropped_text_path: dir.join(format!("{session}.text.dropped")),
        });
    }
    Ok(jobs)
}
