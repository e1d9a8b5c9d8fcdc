//! In-memory representation of an already-parsed session transcript.
//!
//! These types mirror the structured record produced by the external
//! transcript parser (XML acquisition and parsing are out of scope here;
//! see `SPEC_FULL.md` §"Transcript Parser"). The core only consumes this
//! shape, either built directly or deserialized from JSON.

use serde::{Deserialize, Serialize};

/// A full plenary-session transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub number: i32,
    pub year: i32,
    pub begin_time: String,
    pub subsections: Vec<Subsection>,
}

/// One agenda item within a session; statements are ordered chronologically
/// within a subsection (subsections themselves are "mostly chronological",
/// see the Open Questions in `SPEC_FULL.md`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subsection {
    pub number: String,
    #[serde(default)]
    pub title: String,
    pub statements: Vec<Statement>,
}

/// A minimal chairman utterance embedded inside an enclosing [`Statement::Long`].
/// Its position in the enclosing text is marked by the literal sentinel
/// `#ch_statement`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedStatement {
    pub title: String,
    pub firstname: String,
    pub lastname: String,
    pub text: String,
}

/// A contiguous speech act by one speaker.
///
/// Statements come in three shapes. `Long` statements carry full speaker
/// metadata, timestamps and a language tag, and may contain an embedded
/// chairman interjection. `Short` statements are missing timestamps/language
/// (these appear in voting sessions) and never have an embedded statement.
/// `Chairman` statements carry only the bare minimum needed to label them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Statement {
    #[serde(rename = "L")]
    Long {
        mp_id: i32,
        firstname: String,
        lastname: String,
        party: String,
        title: String,
        start_time: String,
        end_time: String,
        language: String,
        text: String,
        #[serde(default)]
        embedded: Option<EmbeddedStatement>,
    },
    #[serde(rename = "S")]
    Short {
        mp_id: i32,
        firstname: String,
        lastname: String,
        party: String,
        title: String,
        #[serde(default)]
        start_time: String,
        #[serde(default)]
        end_time: String,
        #[serde(default)]
        language: String,
        text: String,
    },
    #[serde(rename = "C")]
    Chairman {
        title: String,
        firstname: String,
        lastname: String,
        text: String,
    },
}

impl Statement {
    /// Full text of the statement, including the `#ch_statement` sentinel
    /// for `Long` statements that have an embedded chairman utterance.
    pub fn text(&self) -> &str {
        match self {
            Statement::Long { text, .. } => text,
            Statement::Short { text, .. } => text,
            Statement::Chairman { text, .. } => text,
        }
    }

    /// Speaker's full name, as written into the `speaker` column.
    pub fn speaker_name(&self) -> String {
        match self {
            Statement::Long {
                firstname, lastname, ..
            }
            | Statement::Short {
                firstname, lastname, ..
            }
            | Statement::Chairman {
                firstname, lastname, ..
            } => format!("{firstname} {lastname}"),
        }
    }

    /// MP id, or `0` for chairman statements (no MP id is associated with
    /// the chair).
    pub fn mp_id(&self) -> i32 {
        match self {
            Statement::Long { mp_id, .. } | Statement::Short { mp_id, .. } => *mp_id,
            Statement::Chairman { .. } => 0,
        }
    }

    /// Language tag, `""` when undefined (short and chairman statements).
    pub fn language(&self) -> &str {
        match self {
            Statement::Long { language, .. } | Statement::Short { language, .. } => language,
            Statement::Chairman { .. } => "",
        }
    }

    /// The embedded chairman utterance, if any.
    pub fn embedded(&self) -> Option<&EmbeddedStatement> {
        match self {
            Statement::Long { embedded, .. } => embedded.as_ref(),
            _ => None,
        }
    }
}

impl EmbeddedStatement {
    pub fn speaker_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

/// One normalized text piece ready for matching, paired with the speaker
/// metadata that should be written back onto the CTM rows it aligns to.
///
/// Produced by splitting a [`Statement::Long`] around its embedded
/// chairman utterance (pre-embed / embedded / post-embed), or trivially
/// for statements without one.
#[derive(Debug, Clone)]
pub struct MatchPiece {
    pub speaker_name: String,
    pub mp_id: i32,
    pub language: String,
    pub normalized_text: String,
}

/// Expand a statement into the ordered pieces that must each be located
/// independently in the alignment.
///
/// If the statement has no embedded chairman utterance, this yields a
/// single piece. Otherwise the enclosing text is split around the literal
/// `#ch_statement` sentinel into three pieces, in order: pre-embed
/// (enclosing speaker), embedded (chairman), post-embed (enclosing
/// speaker).
pub fn statement_pieces<'a>(
    statement: &'a Statement,
    normalize: &mut dyn FnMut(&str) -> anyhow::Result<String>,
) -> anyhow::Result<Vec<MatchPiece>> {
    let mut raw: Vec<(String, i32, String, &str)> = Vec::new();

    if let Some(embedded) = statement.embedded() {
        let text = statement.text();
        let Some((pre, post)) = split_on_sentinel(text) else {
            // No literal sentinel present despite an embedded statement:
            // degrade to a single piece rather than silently dropping text.
            raw.push((
                statement.speaker_name(),
                statement.mp_id(),
                statement.language().to_string(),
                text,
            ));
            return finish(raw, normalize);
        };
        raw.push((
            statement.speaker_name(),
            statement.mp_id(),
            statement.language().to_string(),
            pre,
        ));
        raw.push((
            embedded.speaker_name(),
            0,
            String::new(),
            embedded.text.as_str(),
        ));
        raw.push((
            statement.speaker_name(),
            statement.mp_id(),
            statement.language().to_string(),
            post,
        ));
    } else {
        raw.push((
            statement.speaker_name(),
            statement.mp_id(),
            statement.language().to_string(),
            statement.text(),
        ));
    }

    finish(raw, normalize)
}

fn split_on_sentinel(text: &str) -> Option<(&str, &str)> {
    const SENTINEL: &str = "#ch_statement";
    text.find(SENTINEL)
        .map(|idx| (&text[..idx], &text[idx + SENTINEL.len()..]))
}

fn finish(
    raw: Vec<(String, i32, String, &str)>,
    normalize: &mut dyn FnMut(&str) -> anyhow::Result<String>,
) -> anyhow::Result<Vec<MatchPiece>> {
    let mut pieces = Vec::with_capacity(raw.len());
    for (speaker_name, mp_id, language, text) in raw {
        let normalized_text = normalize(text)?;
        // Pieces that normalize to fewer than 2 tokens are skipped; they
        // cannot carry a meaningful match.
        if normalized_text.split_whitespace().count() < 2 {
            continue;
        }
        pieces.push(MatchPiece {
            speaker_name,
            mp_id,
            language,
            normalized_text,
        });
    }
    Ok(pieces)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_normalize(text: &str) -> anyhow::Result<String> {
        Ok(text.to_lowercase())
    }

    #[test]
    fn statement_without_embedded_yields_single_piece() {
        let statement = Statement::Long {
            mp_id: 42,
            firstname: "Anna".into(),
            lastname: "Virtanen".into(),
            party: "kok".into(),
            title: "".into(),
            start_time: "10:00".into(),
            end_time: "10:05".into(),
            language: "fi".into(),
            text: "alpha beta gamma delta epsilon".into(),
            embedded: None,
        };
        let pieces = statement_pieces(&statement, &mut noop_normalize).unwrap();
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].mp_id, 42);
        assert_eq!(pieces[0].speaker_name, "Anna Virtanen");
    }

    #[test]
    fn statement_with_embedded_splits_into_three_pieces() {
        let embedded = EmbeddedStatement {
            title: "puhemies".into(),
            firstname: "Maria".into(),
            lastname: "Lohela".into(),
            text: "aikaa on kulunut".into(),
        };
        let statement = Statement::Long {
            mp_id: 10,
            firstname: "Jussi".into(),
            lastname: "Halla-aho".into(),
            party: "ps".into(),
            title: "".into(),
            start_time: "10:00".into(),
            end_time: "10:10".into(),
            language: "fi".into(),
            text: "alpha beta gamma #ch_statement delta epsilon zeta".into(),
            embedded: Some(embedded),
        };
        let pieces = statement_pieces(&statement, &mut noop_normalize).unwrap();
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0].speaker_name, "Jussi Halla-aho");
        assert_eq!(pieces[1].speaker_name, "Maria Lohela");
        assert_eq!(pieces[1].mp_id, 0);
        assert_eq!(pieces[2].speaker_name, "Jussi Halla-aho");
    }

    #[test]
    fn short_pieces_are_skipped() {
        let statement = Statement::Short {
            mp_id: 1,
            firstname: "A".into(),
            lastname: "B".into(),
            party: "".into(),
            title: "".into(),
            start_time: String::new(),
            end_time: String::new(),
            language: String::new(),
            text: "ok".into(),
        };
        let pieces = statement_pieces(&statement, &mut noop_normalize).unwrap();
        assert!(pieces.is_empty());
    }
}
