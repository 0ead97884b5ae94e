//! Animation frame set and the compressed text asset codec.
//!
//! The overlay animation ships as one static resource: a base64 text payload
//! wrapping a zlib-compressed JSON array of frame strings at a known native
//! frame rate. Line breaks inside a frame are stored as `\n` escapes (with
//! backslashes doubled so the escaping is unambiguous). Decoding is
//! deterministic — the same payload always yields byte-identical frames —
//! and `decode(encode(frames)) == frames` for every frame set, including
//! frames whose text contains a literal backslash-n.
//!
//! Frames are fixed-size character grids; the widest line and tallest frame
//! define the grid the display fit scales against.

use std::io::{Read, Write};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

/// Native frame rate assumed unless the asset is configured otherwise.
pub const DEFAULT_FPS: u32 = 30;

/// Escape a frame for storage: `\` becomes `\\`, a newline becomes `\n`.
fn escape_frame(frame: &str) -> String {
    frame.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Inverse of [`escape_frame`], applied left to right so an escaped
/// backslash never merges with a following `n`. Unknown escapes and a
/// trailing backslash pass through verbatim, which keeps historical assets
/// (line breaks written as plain `\n`, backslashes never doubled) decoding
/// correctly.
fn unescape_frame(frame: &str) -> String {
    let mut out = String::with_capacity(frame.len());
    let mut chars = frame.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Failure while fetching-adjacent work: decoding, decompressing, or parsing
/// the frame asset. All variants are terminal for a playback activation.
#[derive(Debug)]
pub enum AssetError {
    /// The payload is not valid base64 text.
    Encoding(base64::DecodeError),
    /// The compressed stream is corrupt or truncated.
    Decompress(std::io::Error),
    /// The inflated payload is not a JSON array of strings.
    Parse(serde_json::Error),
    /// The asset decoded to zero frames.
    Empty,
}

impl std::fmt::Display for AssetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encoding(e) => write!(f, "asset is not valid base64: {e}"),
            Self::Decompress(e) => write!(f, "asset failed to decompress: {e}"),
            Self::Parse(e) => write!(f, "asset is not a JSON frame array: {e}"),
            Self::Empty => write!(f, "asset contains no frames"),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Encoding(e) => Some(e),
            Self::Decompress(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Empty => None,
        }
    }
}

impl From<base64::DecodeError> for AssetError {
    fn from(e: base64::DecodeError) -> Self {
        Self::Encoding(e)
    }
}

impl From<std::io::Error> for AssetError {
    fn from(e: std::io::Error) -> Self {
        Self::Decompress(e)
    }
}

impl From<serde_json::Error> for AssetError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

/// Ordered, immutable set of text-grid frames at a fixed frame rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSet {
    frames: Vec<String>,
    fps: u32,
    cols: u32,
    rows: u32,
}

impl FrameSet {
    /// Build a frame set from already-decoded frames.
    ///
    /// # Panics
    /// Panics when `fps` is zero — a caller contract violation.
    pub fn new(frames: Vec<String>, fps: u32) -> Result<Self, AssetError> {
        assert!(fps > 0, "frame rate must be positive");
        if frames.is_empty() {
            return Err(AssetError::Empty);
        }

        let mut cols = 0u32;
        let mut rows = 0u32;
        for frame in &frames {
            let mut lines = 0u32;
            for line in frame.lines() {
                lines += 1;
                cols = cols.max(line.chars().count() as u32);
            }
            rows = rows.max(lines);
        }

        Ok(Self {
            frames,
            fps,
            cols,
            rows,
        })
    }

    /// Decode a compressed text asset: base64 → zlib inflate → JSON array.
    ///
    /// Frames are stored with `\n` / `\\` escape sequences
    /// ([`unescape_frame`]); historical assets that wrote plain `\n`
    /// escapes for line breaks decode unchanged under the same rule.
    pub fn decode(text: &str, fps: u32) -> Result<Self, AssetError> {
        let compressed = BASE64.decode(text.trim())?;
        let mut json = String::new();
        ZlibDecoder::new(compressed.as_slice()).read_to_string(&mut json)?;
        let frames: Vec<String> = serde_json::from_str(&json)?;
        let frames = frames.iter().map(|f| unescape_frame(f)).collect();
        Self::new(frames, fps)
    }

    /// Encode into the compressed text asset format. Exact inverse of
    /// [`decode`](Self::decode) for any frame set built via [`new`](Self::new).
    pub fn encode(&self) -> String {
        let escaped: Vec<String> = self.frames.iter().map(|f| escape_frame(f)).collect();
        let json = serde_json::to_string(&escaped).expect("strings always serialize");
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        encoder
            .write_all(json.as_bytes())
            .expect("writing to a Vec cannot fail");
        let compressed = encoder.finish().expect("finishing a Vec sink cannot fail");
        BASE64.encode(compressed)
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// A frame set is never empty; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Native frame rate.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Duration of one frame.
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps as f64)
    }

    /// Grid columns (widest line across all frames).
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Grid rows (tallest frame).
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Frame text at `index`.
    pub fn frame(&self, index: usize) -> &str {
        &self.frames[index]
    }

    /// Index of the last frame.
    pub fn last_index(&self) -> usize {
        self.frames.len() - 1
    }

    /// Frame index for a clock position: `floor(position × fps)`, clamped to
    /// `[0, len - 1]`. Positions past the end stay pinned to the last frame.
    pub fn index_at(&self, position: Duration) -> usize {
        let raw = (position.as_secs_f64() * self.fps as f64).floor() as usize;
        raw.min(self.last_index())
    }
}
