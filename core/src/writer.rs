//! Output Writer: serializes labeled segments and text back out, split
//! into "kept" (a single speaker was confidently identified) and "dropped"
//! (multi-speaker or unidentified) files, each written atomically via a
//! temp-file-then-rename so a reader never observes a partial file.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::segments::{SegmentRow, SegmentsTable, TextTable};

/// Write the four output files for one session.
pub fn write_outputs(
    segments: &SegmentsTable,
    text: &TextTable,
    kept_segments_path: &Path,
    dropped_segments_path: &Path,
    kept_text_path: &Path,
    dropped_text_path: &Path,
) -> Result<()> {
    let by_uttid: HashMap<&str, &SegmentRow> =
        segments.rows.iter().map(|r| (r.uttid.as_str(), r)).collect();

    let mut kept_segments = String::new();
    let mut dropped_segments = String::new();
    for row in &segments.rows {
        if row.new_uttid.is_empty() {
            dropped_segments.push_str(&format!(
                "{} {} {:.2} {:.2} {} {}\n",
                row.uttid,
                row.recordid,
                row.start - row.seg_start,
                row.end - row.seg_start,
                row.mpid,
                row.lang,
            ));
        } else {
            kept_segments.push_str(&format!(
                "{} {} {:.2} {:.2}\n",
                row.new_uttid,
                row.recordid,
                row.start - row.seg_start,
                row.end - row.seg_start,
            ));
        }
    }

    let mut kept_text = String::new();
    let mut dropped_text = String::new();
    for row in &text.rows {
        let Some(seg) = by_uttid.get(row.uttid.as_str()) else {
            continue;
        };
        if seg.new_uttid.is_empty() {
            dropped_text.push_str(&format!("{} {} {} {}\n", row.uttid, row.text, seg.mpid, seg.lang));
        } else {
            kept_text.push_str(&format!("{} {}\n", seg.new_uttid, row.text));
        }
    }

    atomic_write(kept_segments_path, &kept_segments)?;
    atomic_write(dropped_segments_path, &dropped_segments)?;
    atomic_write(kept_text_path, &kept_text)?;
    atomic_write(dropped_text_path, &dropped_text)?;
    Ok(())
}

fn atomic_write(path: &Path, contents: &str) -> Result<()> {
    let tmp = sibling_tmp_path(path);
    {
        let mut f = File::create(&tmp)?;
        f.write_all(contents.as_bytes())?;
        f.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

fn sibling_tmp_path(target: &Path) -> PathBuf {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    dir.join(format!(".{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::TextRow;
    use tempfile::tempdir;

    fn segment(uttid: &str, new_uttid: &str, mpid: i32, lang: &str) -> SegmentRow {
        SegmentRow {
            uttid: uttid.into(),
            recordid: "session-001-2015".into(),
            start: 1.0,
            end: 2.0,
            seg_start: 0.0,
            seg_end: 10.0,
            seg_id: 0,
            mpid,
            lang: lang.into(),
            new_uttid: new_uttid.into(),
        }
    }

    #[test]
    fn splits_kept_and_dropped_rows() {
        let mut segments = SegmentsTable::default();
        segments.push(segment("u1", "01301-session-001-2015-00000100-00000200", 1301, "fi"));
        segments.push(segment("u2", "", -1, "fi"));

        let mut text = TextTable::default();
        text.push(TextRow {
            uttid: "u1".into(),
            text: "hello world".into(),
            mpid: 0,
            lang: String::new(),
            new_uttid: String::new(),
        });
        text.push(TextRow {
            uttid: "u2".into(),
            text: "overlapping speech".into(),
            mpid: 0,
            lang: String::new(),
            new_uttid: String::new(),
        });

        let dir = tempdir().unwrap();
        let kept_seg = dir.path().join("kept.segments");
        let dropped_seg = dir.path().join("dropped.segments");
        let kept_txt = dir.path().join("kept.text");
        let dropped_txt = dir.path().join("dropped.text");

        write_outputs(&segments, &text, &kept_seg, &dropped_seg, &kept_txt, &dropped_txt).unwrap();

        let kept_seg_contents = fs::read_to_string(&kept_seg).unwrap();
        assert!(kept_seg_contents.contains("01301-session-001-2015-00000100-00000200"));
        let dropped_seg_contents = fs::read_to_string(&dropped_seg).unwrap();
        assert!(dropped_seg_contents.contains("u2"));
        assert!(dropped_seg_contents.contains("-1"));

        let kept_txt_contents = fs::read_to_string(&kept_txt).unwrap();
        assert!(kept_txt_contents.contains("hello world"));
        let dropped_txt_contents = fs::read_to_string(&dropped_txt).unwrap();
        assert!(dropped_txt_contents.contains("overlapping speech"));
    }
}
