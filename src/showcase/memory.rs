//! In-memory players and presenter.
//!
//! Clones share state, so a caller can hand one clone to the controller and
//! keep another to observe or drive it. Used by the demo and the tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::player::{MediaState, PlayError, Player, Preload, Presenter};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug)]
struct PlayerInner {
    state: MediaState,
    position: f64,
    duration: Option<f64>,
    muted: bool,
    preload: Preload,
    fail_next: Option<PlayError>,
    play_calls: usize,
}

/// A player that keeps its state in memory and only moves when told to
#[derive(Debug, Clone)]
pub struct MemoryPlayer {
    inner: Arc<Mutex<PlayerInner>>,
}

impl MemoryPlayer {
    /// A player whose media lasts `duration` seconds
    pub fn new(duration: f64) -> Self {
        Self::with_duration(Some(duration))
    }

    /// A player whose metadata has not loaded yet
    pub fn unloaded() -> Self {
        Self::with_duration(None)
    }

    fn with_duration(duration: Option<f64>) -> Self {
        MemoryPlayer {
            inner: Arc::new(Mutex::new(PlayerInner {
                state: MediaState::Paused,
                position: 0.0,
                duration,
                muted: false,
                preload: Preload::None,
                fail_next: None,
                play_calls: 0,
            })),
        }
    }

    /// Make the next `play` call fail with `err`
    pub fn fail_next_play(&self, err: PlayError) {
        lock(&self.inner).fail_next = Some(err);
    }

    pub fn set_position(&self, seconds: f64) {
        lock(&self.inner).position = seconds;
    }

    /// Advance playback by `seconds` if playing. Returns true when this step
    /// reached the end of the media.
    pub fn advance(&self, seconds: f64) -> bool {
        let mut p = lock(&self.inner);
        if p.state != MediaState::Playing {
            return false;
        }
        p.position += seconds;
        let duration = p.duration;
        match duration {
            Some(d) if p.position >= d => {
                p.position = d;
                p.state = MediaState::Ended;
                true
            }
            _ => false,
        }
    }

    pub fn is_muted(&self) -> bool {
        lock(&self.inner).muted
    }

    pub fn preload(&self) -> Preload {
        lock(&self.inner).preload
    }

    pub fn play_calls(&self) -> usize {
        lock(&self.inner).play_calls
    }
}

impl Player for MemoryPlayer {
    fn play(&mut self) -> Result<(), PlayError> {
        let mut p = lock(&self.inner);
        p.play_calls += 1;
        if let Some(err) = p.fail_next.take() {
            return Err(err);
        }
        if p.state == MediaState::Ended {
            p.position = 0.0;
        }
        p.state = MediaState::Playing;
        Ok(())
    }

    fn pause(&mut self) {
        lock(&self.inner).state = MediaState::Paused;
    }

    fn seek(&mut self, seconds: f64) {
        let mut p = lock(&self.inner);
        let target = match p.duration {
            Some(d) => seconds.clamp(0.0, d),
            None => seconds.max(0.0),
        };
        p.position = target;
        if p.state == MediaState::Ended {
            p.state = MediaState::Paused;
        }
    }

    fn set_muted(&mut self, muted: bool) {
        lock(&self.inner).muted = muted;
    }

    fn set_preload(&mut self, preload: Preload) {
        lock(&self.inner).preload = preload;
    }

    fn state(&self) -> MediaState {
        lock(&self.inner).state
    }

    fn position(&self) -> f64 {
        lock(&self.inner).position
    }

    fn duration(&self) -> Option<f64> {
        lock(&self.inner).duration
    }
}

#[derive(Debug, Default)]
struct PresenterInner {
    scrolls: Vec<f64>,
    progress: HashMap<usize, f64>,
}

/// Records scroll requests and progress bar widths
#[derive(Debug, Clone, Default)]
pub struct MemoryPresenter {
    inner: Arc<Mutex<PresenterInner>>,
}

impl MemoryPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_scroll(&self) -> Option<f64> {
        lock(&self.inner).scrolls.last().copied()
    }

    pub fn scroll_history(&self) -> Vec<f64> {
        lock(&self.inner).scrolls.clone()
    }

    pub fn progress(&self, index: usize) -> Option<f64> {
        lock(&self.inner).progress.get(&index).copied()
    }
}

impl Presenter for MemoryPresenter {
    fn scroll_to(&mut self, offset: f64) {
        lock(&self.inner).scrolls.push(offset);
    }

    fn set_progress(&mut self, index: usize, percent: f64) {
        lock(&self.inner).progress.insert(index, percent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_player_transitions_state() {
        let mut m = MemoryPlayer::new(2.0);
        assert_eq!(m.state(), MediaState::Paused);
        m.play().unwrap();
        assert_eq!(m.state(), MediaState::Playing);
        assert!(!m.advance(1.0));
        assert!(m.advance(1.5));
        assert_eq!(m.state(), MediaState::Ended);
        assert_eq!(m.position(), 2.0);
        m.seek(0.0);
        assert_eq!(m.state(), MediaState::Paused);
        assert_eq!(m.position(), 0.0);
    }

    #[test]
    fn clones_share_state() {
        let m = MemoryPlayer::new(1.0);
        let mut handle = m.clone();
        handle.play().unwrap();
        assert_eq!(m.state(), MediaState::Playing);
        assert_eq!(m.play_calls(), 1);
    }

    #[test]
    fn injected_failure_fires_once() {
        let mut m = MemoryPlayer::new(1.0);
        m.fail_next_play(PlayError::Aborted);
        assert_eq!(m.play(), Err(PlayError::Aborted));
        assert_eq!(m.state(), MediaState::Paused);
        assert!(m.play().is_ok());
    }
}
