//! The fixed showcase catalog.
//!
//! The carousel shows three reels, repeated four times so the strip always has
//! cards on both sides of the active one while it loops.

use serde::Serialize;

/// How many times the base reels are repeated to fill the looping strip
pub const CATALOG_REPEAT: usize = 4;

/// A single reel shown in the carousel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaItem {
    pub title: String,
    pub category: String,
    pub source_url: String,
}

impl MediaItem {
    pub fn new(title: &str, category: &str, source_url: &str) -> Self {
        Self {
            title: title.to_string(),
            category: category.to_string(),
            source_url: source_url.to_string(),
        }
    }
}

/// The three base reels, in playback order
pub fn base_reels() -> Vec<MediaItem> {
    vec![
        MediaItem::new(
            "Duke Streetfighter",
            "Bike Edit",
            "https://www.dropbox.com/scl/fi/7zk2o7jv6anjerfumw47u/finalrender_prob3.mp4?rlkey=g92ueblkao2ntbpxi6lwqme7l&st=lxkr0dgr&raw=1",
        ),
        MediaItem::new(
            "Demon Slayer",
            "Anime Edit",
            "https://www.dropbox.com/scl/fi/6782d3s6zotx1ouvsii3n/Demon-slayer-anime-animeedit-demonslayer-infinitycastle-edit-1.mp4?rlkey=d9k6srazihb0s9nncxfc5o4pj&st=8whdtw36&raw=1",
        ),
        MediaItem::new(
            "Porsche 911",
            "Automotive Edit",
            "https://www.dropbox.com/scl/fi/9h8uhfvxjiw27pbqowdcd/Porache-911-car-automobile-edit-reels-aftereffects-caredit-editing-drift-drifting-cartok-1.mp4?rlkey=wqkifqnhqafaihvs48raratp6&st=pml7yswj&raw=1",
        ),
    ]
}

/// Repeat `items` `times` times, keeping insertion order within each pass
pub fn repeat_catalog(items: &[MediaItem], times: usize) -> Vec<MediaItem> {
    let mut out = Vec::with_capacity(items.len() * times);
    for _ in 0..times {
        out.extend(items.iter().cloned());
    }
    out
}

/// The catalog the showcase mounts with
pub fn showcase_catalog() -> Vec<MediaItem> {
    repeat_catalog(&base_reels(), CATALOG_REPEAT)
}
