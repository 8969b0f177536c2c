//! Player and presenter seams the controller drives

use thiserror::Error;

/// Observable state of a single player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaState {
    Playing,
    Paused,
    Ended,
}

/// How eagerly a player should fetch its media
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preload {
    /// Fetch enough to start playing immediately
    Auto,
    /// Do not fetch anything until asked to play
    None,
}

/// Why a player refused or failed to start playback
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayError {
    /// A newer play/pause request interrupted this one
    #[error("playback interrupted by a newer request")]
    Aborted,

    /// The environment blocked playback (autoplay policy and the like)
    #[error("playback not allowed: {0}")]
    NotAllowed(String),

    /// The media cannot be decoded
    #[error("unsupported media: {0}")]
    Unsupported(String),

    #[error("{0}")]
    Other(String),
}

/// A media element owned by the controller.
///
/// Only the controller calls these; everything else goes through
/// `PlaybackController`.
pub trait Player: Send {
    fn play(&mut self) -> Result<(), PlayError>;
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
    fn set_muted(&mut self, muted: bool);
    fn set_preload(&mut self, preload: Preload);
    fn state(&self) -> MediaState;
    /// Current playback position in seconds
    fn position(&self) -> f64;
    /// Total duration in seconds, if known yet
    fn duration(&self) -> Option<f64>;
}

/// The visual side of the carousel: scroll position and progress bars
pub trait Presenter: Send {
    fn scroll_to(&mut self, offset: f64);
    fn set_progress(&mut self, index: usize, percent: f64);
}
