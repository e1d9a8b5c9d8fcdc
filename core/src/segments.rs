//! Segment and text tables: the upstream segmenter's output, later
//! enriched with the speaker/language labels the core derives.

/// One row of the `.segments` file, already converted to absolute session
/// seconds (`start`/`end` are offset by the embedding segment's `seg_start`).
#[derive(Debug, Clone)]
pub struct SegmentRow {
    pub uttid: String,
    pub recordid: String,
    pub start: f64,
    pub end: f64,
    pub seg_start: f64,
    pub seg_end: f64,
    pub seg_id: i64,

    /// Added by the labeler: the resolved speaker id, `0 | -1 | mp_id`.
    pub mpid: i32,
    /// Added by the labeler: resolved language tag.
    pub lang: String,
    /// Added by the labeler: rewritten uttid, `""` when the segment is dropped.
    pub new_uttid: String,
}

#[derive(Debug, Default)]
pub struct SegmentsTable {
    pub rows: Vec<SegmentRow>,
}

impl SegmentsTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, row: SegmentRow) {
        self.rows.push(row);
    }
}

/// One row of the `.text` file.
#[derive(Debug, Clone)]
pub struct TextRow {
    pub uttid: String,
    pub text: String,
    pub mpid: i32,
    pub lang: String,
    pub new_uttid: String,
}

#[derive(Debug, Default)]
pub struct TextTable {
    pub rows: Vec<TextRow>,
}

impl TextTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, row: TextRow) {
        self.rows.push(row);
    }
}
