//! CTM (time-marked conversation map) tables and parsing.

pub mod loader;
pub mod segment_info;
pub mod types;

pub use loader::{load_ctm_edits, load_segments, load_text};
pub use segment_info::{extract_segment_info, SegmentInfo};
pub use types::{CtmRow, CtmTable, Edit, EPS, UNK};
