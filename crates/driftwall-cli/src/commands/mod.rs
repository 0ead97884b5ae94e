pub mod encode;
pub mod inspect;
pub mod stats;
pub mod wall;

use std::fs;
use std::io;
use std::path::Path;

use driftwall_core::{FrameSet, Message};

/// Load a feed snapshot from a JSON file.
pub fn load_feed(path: &Path) -> io::Result<Vec<Message>> {
    let text = fs::read_to_string(path)?;
    driftwall_core::parse_snapshot(&text).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{}: {e}", path.display()),
        )
    })
}

/// Load and decode a compressed frame asset from a file.
pub fn load_asset(path: &Path, fps: u32) -> io::Result<FrameSet> {
    let text = fs::read_to_string(path)?;
    FrameSet::decode(&text, fps).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{}: {e}", path.display()),
        )
    })
}

/// Print an error and exit. Commands call this instead of propagating.
pub fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_feed_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "a", "author": "ada", "body": "hi", "score": 2}}]"#
        )
        .unwrap();

        let feed = load_feed(file.path()).unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].author, "ada");
    }

    #[test]
    fn test_load_feed_invalid_json_is_invalid_data() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = load_feed(file.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_load_feed_missing_file() {
        let err = load_feed(Path::new("/nonexistent/feed.json")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_load_asset_roundtrip() {
        let asset = FrameSet::new(vec!["##\n..".into()], 30).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", asset.encode()).unwrap();

        let loaded = load_asset(file.path(), 30).unwrap();
        assert_eq!(loaded, asset);
    }

    #[test]
    fn test_load_asset_garbage_is_invalid_data() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "@@@").unwrap();

        let err = load_asset(file.path(), 30).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
