//! Launch the live wall TUI.

use std::path::{Path, PathBuf};

use super::{fail, load_asset, load_feed};
use crate::tui::app::App;

pub struct WallCommandConfig<'a> {
    pub feed_path: &'a str,
    pub asset_path: Option<&'a str>,
    pub fps: u32,
    pub capacity: Option<usize>,
    pub seed: Option<u64>,
    pub require_gesture: bool,
}

pub fn run(config: WallCommandConfig) {
    let feed = match load_feed(Path::new(config.feed_path)) {
        Ok(feed) => feed,
        Err(e) => fail(e),
    };

    // Decode up front so a bad asset fails before the terminal is taken over.
    let asset = match config.asset_path {
        Some(path) => match load_asset(Path::new(path), config.fps) {
            Ok(asset) => Some(asset),
            Err(e) => fail(e),
        },
        None => None,
    };

    let mut app = App::new(
        PathBuf::from(config.feed_path),
        feed,
        asset,
        config.capacity,
        config.seed,
        config.require_gesture,
    );

    if let Err(e) = app.run() {
        fail(e);
    }
}
