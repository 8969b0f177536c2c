//! Showreel
//!
//! The moving parts behind a studio showreel page: the showcase carousel that
//! keeps exactly one reel playing, and a small proxy that lets the page call a
//! text generation API without shipping the credential to the browser.
//!
//! # Features
//!
//! - **Showcase controller**: one active reel, auto-advance on end, looping
//!   forever, with a cancellable settle delay before playback starts
//! - **Generation proxy** (`proxy`, default): CORS-enabled POST endpoint that
//!   forwards prompts upstream and relays the JSON response verbatim
//!
//! # Example
//!
//! ```
//! use showreel::catalog::showcase_catalog;
//! use showreel::showcase::{
//!     MemoryPlayer, MemoryPresenter, MediaState, PlaybackController, Player, ShowcaseConfig,
//! };
//! use tokio::time::Instant;
//!
//! # fn main() -> showreel::Result<()> {
//! let items = showcase_catalog();
//! let players: Vec<MemoryPlayer> = items.iter().map(|_| MemoryPlayer::new(12.0)).collect();
//! let config = ShowcaseConfig::default();
//! let t0 = Instant::now();
//!
//! let mut showcase =
//!     PlaybackController::mount(items, players.clone(), MemoryPresenter::new(), config, t0)?;
//! showcase.set_active(2, t0)?;
//! showcase.fire_due(t0 + config.settle_delay);
//! assert_eq!(players[2].state(), MediaState::Playing);
//! # Ok(())
//! # }
//! ```

pub mod brief;
pub mod catalog;
pub mod error;
pub use error::{Error, Result};

pub mod showcase;

// HTTP proxy for the generation API
#[cfg(feature = "proxy")]
pub mod proxy;

pub use catalog::MediaItem;
pub use showcase::{PlaybackController, Showcase, ShowcaseConfig, ShowcaseEvent};
