//! Showcase carousel playback.
//!
//! The carousel is a looping strip of reels where exactly one plays at a
//! time. Selecting a card (or letting the active one finish) pauses the
//! others, scrolls the new card to the middle of the viewport and, after a
//! short settle delay, starts it.
//!
//! [`PlaybackController`] is the synchronous state machine; [`Showcase`]
//! runs one on a tokio task and waits out the settle delay for you.

pub mod controller;
pub mod driver;
pub mod layout;
pub mod memory;
pub mod player;

use std::time::Duration;

pub use controller::{PendingStart, PlaybackController, PlaybackState, ShowcaseEvent, TimerToken};
pub use driver::{Showcase, ShowcaseSnapshot};
pub use layout::CarouselLayout;
pub use memory::{MemoryPlayer, MemoryPresenter};
pub use player::{MediaState, PlayError, Player, Preload, Presenter};

/// Wait between scrolling a card into view and starting it
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Configuration for a [`PlaybackController`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShowcaseConfig {
    /// Delay between the scroll and the start of playback
    pub settle_delay: Duration,
    /// Geometry used to compute the centering scroll offset
    pub layout: CarouselLayout,
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            settle_delay: SETTLE_DELAY,
            layout: CarouselLayout::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_half_second_settle() {
        let cfg = ShowcaseConfig::default();
        assert_eq!(cfg.settle_delay, Duration::from_millis(500));
        assert_eq!(cfg.layout.card_width, 800.0);
    }
}
