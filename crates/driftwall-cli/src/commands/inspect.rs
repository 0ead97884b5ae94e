//! Decode a frame asset and print its shape.

use std::path::Path;

use super::{fail, load_asset};

pub fn run(asset: &str, fps: u32, frame: Option<usize>, json: bool) {
    let set = match load_asset(Path::new(asset), fps) {
        Ok(set) => set,
        Err(e) => fail(e),
    };

    let duration_secs = set.len() as f64 / set.fps() as f64;

    if json {
        let report = serde_json::json!({
            "frames": set.len(),
            "fps": set.fps(),
            "cols": set.cols(),
            "rows": set.rows(),
            "duration_secs": duration_secs,
        });
        println!("{}", serde_json::to_string_pretty(&report).unwrap());
    } else {
        println!("Frames:   {}", set.len());
        println!("Rate:     {} fps", set.fps());
        println!("Grid:     {}x{}", set.cols(), set.rows());
        println!("Duration: {duration_secs:.1}s");
    }

    if let Some(idx) = frame {
        if idx > set.last_index() {
            fail(format_args!(
                "frame {idx} out of range (0..={})",
                set.last_index()
            ));
        }
        println!("\n{}", set.frame(idx));
    }
}
