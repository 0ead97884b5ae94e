//! Pack a JSON array of frame strings into the compressed text asset.

use std::fs;

use driftwall_core::FrameSet;

use super::fail;

pub fn run(input: &str, output: Option<&str>, fps: u32) {
    let json = match fs::read_to_string(input) {
        Ok(text) => text,
        Err(e) => fail(format_args!("{input}: {e}")),
    };

    let frames: Vec<String> = match serde_json::from_str(&json) {
        Ok(frames) => frames,
        Err(e) => fail(format_args!("{input}: not a JSON array of strings: {e}")),
    };

    let set = match FrameSet::new(frames, fps) {
        Ok(set) => set,
        Err(e) => fail(e),
    };

    let encoded = set.encode();

    match output {
        Some(path) => {
            if let Err(e) = fs::write(path, &encoded) {
                fail(format_args!("{path}: {e}"));
            }
            eprintln!(
                "Packed {} frames ({}x{} grid, {} fps): {} -> {} bytes ({:.1}%)",
                set.len(),
                set.cols(),
                set.rows(),
                set.fps(),
                json.len(),
                encoded.len(),
                encoded.len() as f64 / json.len() as f64 * 100.0
            );
        }
        None => println!("{encoded}"),
    }
}
