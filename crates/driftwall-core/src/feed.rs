//! Message records delivered by the content feed.
//!
//! The feed is an external collaborator: whenever any record changes it
//! pushes a full-replace, ordered snapshot. The engine never diffs — it
//! re-derives its weight table and resets the swarm batch on every receipt.
//! Records are immutable within a snapshot.

use serde::{Deserialize, Serialize};

/// Author shown when a message was submitted without a name.
pub const ANONYMOUS: &str = "Anonymous";

/// One user-submitted message with a popularity score.
///
/// `body` may carry limited inline markup; it passes through the engine
/// untouched. Neutralizing unsafe markup is the render collaborator's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique id assigned by the feed.
    pub id: String,
    /// Display name, defaulting to [`ANONYMOUS`] when absent.
    #[serde(default = "default_author")]
    pub author: String,
    /// Message text, possibly with inline markup.
    pub body: String,
    /// Popularity score. Any sign; negative scores make a record ineligible
    /// for sampling.
    #[serde(default)]
    pub score: i64,
}

fn default_author() -> String {
    ANONYMOUS.to_string()
}

impl Message {
    /// Construct a message with an explicit author.
    pub fn new(
        id: impl Into<String>,
        author: impl Into<String>,
        body: impl Into<String>,
        score: i64,
    ) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            body: body.into(),
            score,
        }
    }

    /// Construct an anonymous message.
    pub fn anonymous(id: impl Into<String>, body: impl Into<String>, score: i64) -> Self {
        Self::new(id, ANONYMOUS, body, score)
    }
}

/// Parse a full-replace snapshot from a JSON array of records.
pub fn parse_snapshot(json: &str) -> Result<Vec<Message>, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snapshot_basic() {
        let json = r#"[
            {"id": "a", "author": "ada", "body": "hello", "score": 3},
            {"id": "b", "body": "hi", "score": 1}
        ]"#;
        let msgs = parse_snapshot(json).unwrap();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].author, "ada");
        assert_eq!(msgs[1].author, ANONYMOUS);
    }

    #[test]
    fn test_parse_snapshot_missing_score_defaults_zero() {
        let json = r#"[{"id": "a", "body": "x"}]"#;
        let msgs = parse_snapshot(json).unwrap();
        assert_eq!(msgs[0].score, 0);
    }

    #[test]
    fn test_parse_snapshot_rejects_garbage() {
        assert!(parse_snapshot("not json").is_err());
    }

    #[test]
    fn test_message_roundtrip() {
        let msg = Message::new("id-1", "bob", "<b>bold</b>", -2);
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }
}
