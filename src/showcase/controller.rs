//! The showcase playback controller.
//!
//! `PlaybackController` owns the players for every catalog item and keeps
//! exactly one of them playing. All mutation goes through the operations on
//! this type; time is passed in explicitly so the single deferred action (the
//! settle delay before playback starts) can be driven by any event loop.

use log::{debug, warn};
use tokio::time::Instant;

use super::player::{MediaState, PlayError, Player, Preload, Presenter};
use super::ShowcaseConfig;
use crate::catalog::MediaItem;
use crate::{Error, Result};

/// Identifies one scheduled playback start
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimerToken(u64);

/// A playback start waiting for the settle delay to elapse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingStart {
    pub token: TimerToken,
    pub index: usize,
    pub due: Instant,
}

/// Which item is active and which items are muted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackState {
    active_index: usize,
    muted: Vec<bool>,
}

impl PlaybackState {
    fn new(len: usize) -> Self {
        Self {
            active_index: 0,
            muted: vec![true; len],
        }
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn muted_flags(&self) -> &[bool] {
        &self.muted
    }

    pub fn is_muted(&self, index: usize) -> Option<bool> {
        self.muted.get(index).copied()
    }
}

/// Events the page feeds into the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowcaseEvent {
    /// The user clicked a card
    Select(usize),
    /// An item reached the end of its media
    Ended(usize),
    /// The mute button on a card was pressed
    ToggleMute(usize),
    /// Periodic time update from a playing item
    Progress(usize),
}

pub struct PlaybackController<P: Player, S: Presenter> {
    items: Vec<MediaItem>,
    players: Vec<P>,
    presenter: S,
    config: ShowcaseConfig,
    state: PlaybackState,
    pending: Option<PendingStart>,
    next_token: u64,
    attached: bool,
}

impl<P: Player, S: Presenter> PlaybackController<P, S> {
    /// Take ownership of one player per item and start the display on the
    /// first item.
    pub fn mount(
        items: Vec<MediaItem>,
        players: Vec<P>,
        presenter: S,
        config: ShowcaseConfig,
        now: Instant,
    ) -> Result<Self> {
        if items.is_empty() {
            return Err(Error::ConfigError("showcase needs at least one item".into()));
        }
        if players.len() != items.len() {
            return Err(Error::ConfigError(format!(
                "expected {} players, got {}",
                items.len(),
                players.len()
            )));
        }

        let state = PlaybackState::new(items.len());
        let mut controller = Self {
            items,
            players,
            presenter,
            config,
            state,
            pending: None,
            next_token: 0,
            attached: true,
        };
        for (player, muted) in controller.players.iter_mut().zip(&controller.state.muted) {
            player.set_muted(*muted);
        }
        controller.transition(0, now);
        Ok(controller)
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn players(&self) -> &[P] {
        &self.players
    }

    pub fn presenter(&self) -> &S {
        &self.presenter
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn active_index(&self) -> usize {
        self.state.active_index
    }

    pub fn pending(&self) -> Option<PendingStart> {
        self.pending
    }

    /// When the pending playback start is due, if one is scheduled
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.due)
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Number of players currently playing. Never more than one.
    pub fn playing_count(&self) -> usize {
        self.players
            .iter()
            .filter(|p| p.state() == MediaState::Playing)
            .count()
    }

    pub fn dispatch(&mut self, event: ShowcaseEvent, now: Instant) -> Result<()> {
        match event {
            ShowcaseEvent::Select(i) => self.set_active(i, now),
            ShowcaseEvent::Ended(i) => self.on_playback_ended(i, now),
            ShowcaseEvent::ToggleMute(i) => self.toggle_mute(i).map(|_| ()),
            ShowcaseEvent::Progress(i) => self.on_progress(i).map(|_| ()),
        }
    }

    /// Make `index` the active item and run the transition.
    pub fn set_active(&mut self, index: usize, now: Instant) -> Result<()> {
        self.check(index)?;
        self.transition(index, now);
        Ok(())
    }

    /// Natural end of an item's media.
    ///
    /// The item is rewound either way. If it was the active item, the
    /// display advances to the next one, wrapping to the start; the rewound
    /// item stays paused until it becomes active again.
    pub fn on_playback_ended(&mut self, index: usize, now: Instant) -> Result<()> {
        self.check(index)?;
        self.players[index].seek(0.0);
        if index != self.state.active_index {
            // Only the active item may play.
            self.players[index].pause();
            return Ok(());
        }
        let next = (index + 1) % self.items.len();
        debug!("showcase: item {} ended, advancing to {}", index, next);
        self.transition(next, now);
        Ok(())
    }

    /// Flip the mute flag for `index` and apply it to the player. Returns the
    /// new flag.
    pub fn toggle_mute(&mut self, index: usize) -> Result<bool> {
        self.check(index)?;
        let muted = !self.state.muted[index];
        self.state.muted[index] = muted;
        self.players[index].set_muted(muted);
        Ok(muted)
    }

    /// Push the progress of `index` to the presenter. Returns the percentage
    /// shown, or `None` while the duration is unknown.
    pub fn on_progress(&mut self, index: usize) -> Result<Option<f64>> {
        self.check(index)?;
        let player = &self.players[index];
        let percent = match player.duration() {
            Some(d) if d.is_finite() && d > 0.0 => (player.position() / d * 100.0).clamp(0.0, 100.0),
            _ => return Ok(None),
        };
        self.presenter.set_progress(index, percent);
        Ok(Some(percent))
    }

    /// Run the pending playback start if it is due at `now`. Returns whether
    /// a start was attempted.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        let pending = match self.pending {
            Some(p) if p.due <= now => p,
            _ => return false,
        };
        self.pending = None;

        if !self.attached {
            return false;
        }
        if pending.index != self.state.active_index {
            debug!(
                "showcase: dropping stale start {:?} for item {} (active is {})",
                pending.token, pending.index, self.state.active_index
            );
            return false;
        }

        let index = pending.index;
        let player = &mut self.players[index];
        player.set_muted(self.state.muted[index]);
        match player.play() {
            Ok(()) => debug!("showcase: playing item {}", index),
            Err(PlayError::Aborted) => {}
            Err(e) => warn!("showcase: could not start item {}: {}", index, e),
        }
        true
    }

    /// Cancel any pending start, pause every player and stop accepting
    /// events.
    pub fn teardown(&mut self) {
        if !self.attached {
            return;
        }
        if let Some(p) = self.pending.take() {
            debug!("showcase: cancelled start {:?} on teardown", p.token);
        }
        for player in &mut self.players {
            if player.state() == MediaState::Playing {
                player.pause();
            }
        }
        self.attached = false;
    }

    fn check(&self, index: usize) -> Result<()> {
        if !self.attached {
            return Err(Error::Detached);
        }
        if index >= self.items.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(())
    }

    fn transition(&mut self, index: usize, now: Instant) {
        self.state.active_index = index;

        for (i, player) in self.players.iter_mut().enumerate() {
            if i != index && player.state() == MediaState::Playing {
                player.pause();
            }
        }

        let len = self.items.len();
        let successor = (index + 1) % len;
        for (i, player) in self.players.iter_mut().enumerate() {
            let preload = if i == index || i == successor {
                Preload::Auto
            } else {
                Preload::None
            };
            player.set_preload(preload);
        }

        let offset = self.config.layout.centered_offset(index, len);
        self.presenter.scroll_to(offset);

        let token = TimerToken(self.next_token);
        self.next_token += 1;
        if let Some(old) = self.pending.replace(PendingStart {
            token,
            index,
            due: now + self.config.settle_delay,
        }) {
            debug!("showcase: start {:?} superseded by {:?}", old.token, token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::showcase_catalog;
    use crate::showcase::{MemoryPlayer, MemoryPresenter};
    use std::time::Duration;

    fn mount() -> (PlaybackController<MemoryPlayer, MemoryPresenter>, Vec<MemoryPlayer>, MemoryPresenter, Instant) {
        let items = showcase_catalog();
        let players: Vec<MemoryPlayer> = items.iter().map(|_| MemoryPlayer::new(10.0)).collect();
        let presenter = MemoryPresenter::new();
        let now = Instant::now();
        let c = PlaybackController::mount(
            items,
            players.clone(),
            presenter.clone(),
            ShowcaseConfig::default(),
            now,
        )
        .unwrap();
        (c, players, presenter, now)
    }

    fn settle() -> Duration {
        ShowcaseConfig::default().settle_delay
    }

    #[test]
    fn mount_starts_first_item_after_settle() {
        let (mut c, players, _, t0) = mount();
        assert_eq!(c.active_index(), 0);
        assert!(!c.fire_due(t0 + settle() - Duration::from_millis(1)));
        assert_eq!(c.playing_count(), 0);
        assert!(c.fire_due(t0 + settle()));
        assert_eq!(players[0].state(), MediaState::Playing);
        assert_eq!(c.playing_count(), 1);
    }

    #[test]
    fn mount_rejects_mismatched_players() {
        let items = showcase_catalog();
        let res = PlaybackController::mount(
            items,
            vec![MemoryPlayer::new(1.0)],
            MemoryPresenter::new(),
            ShowcaseConfig::default(),
            Instant::now(),
        );
        assert!(matches!(res, Err(Error::ConfigError(_))));
    }

    #[test]
    fn set_active_pauses_others_and_plays_target() {
        let (mut c, players, presenter, t0) = mount();
        c.fire_due(t0 + settle());

        let t1 = t0 + Duration::from_secs(2);
        c.set_active(5, t1).unwrap();
        assert_eq!(players[0].state(), MediaState::Paused);
        assert_eq!(c.playing_count(), 0);
        assert_eq!(
            presenter.last_scroll(),
            Some(ShowcaseConfig::default().layout.centered_offset(5, 12))
        );

        c.fire_due(t1 + settle());
        assert_eq!(players[5].state(), MediaState::Playing);
        assert_eq!(c.playing_count(), 1);
    }

    #[test]
    fn newer_selection_supersedes_pending_start() {
        let (mut c, players, _, t0) = mount();
        c.set_active(3, t0 + Duration::from_millis(100)).unwrap();
        c.set_active(7, t0 + Duration::from_millis(200)).unwrap();

        // The superseded deadlines would have been at 500 and 600 ms.
        assert!(!c.fire_due(t0 + Duration::from_millis(600)));
        assert!(c.fire_due(t0 + Duration::from_millis(700)));
        assert_eq!(players[3].state(), MediaState::Paused);
        assert_eq!(players[7].state(), MediaState::Playing);
        assert_eq!(c.playing_count(), 1);
    }

    #[test]
    fn ended_on_active_advances_by_one() {
        let (mut c, _, _, t0) = mount();
        c.set_active(4, t0).unwrap();
        c.on_playback_ended(4, t0).unwrap();
        assert_eq!(c.active_index(), 5);
    }

    #[test]
    fn ended_on_last_wraps_to_first() {
        let (mut c, players, _, t0) = mount();
        c.set_active(11, t0).unwrap();
        c.fire_due(t0 + settle());
        players[11].set_position(10.0);

        let t1 = t0 + Duration::from_secs(10);
        c.on_playback_ended(11, t1).unwrap();
        assert_eq!(c.active_index(), 0);
        assert_eq!(players[11].position(), 0.0);
        assert_eq!(players[11].state(), MediaState::Paused);

        c.fire_due(t1 + settle());
        assert_eq!(players[0].state(), MediaState::Playing);
    }

    #[test]
    fn ended_on_inactive_rewinds_without_advancing() {
        let (mut c, players, _, t0) = mount();
        players[6].set_position(4.0);
        c.on_playback_ended(6, t0).unwrap();
        assert_eq!(c.active_index(), 0);
        assert_eq!(players[6].position(), 0.0);
        assert_eq!(players[6].state(), MediaState::Paused);
    }

    #[test]
    fn toggle_mute_flips_only_that_entry() {
        let (mut c, players, _, _) = mount();
        let before = c.state().muted_flags().to_vec();
        assert!(!c.toggle_mute(2).unwrap());
        let after = c.state().muted_flags();
        for i in 0..after.len() {
            if i == 2 {
                assert_ne!(after[i], before[i]);
            } else {
                assert_eq!(after[i], before[i]);
            }
        }
        assert!(!players[2].is_muted());
        assert_eq!(c.active_index(), 0);
        assert!(c.toggle_mute(2).unwrap());
    }

    #[test]
    fn start_applies_stored_mute_flag() {
        let (mut c, players, _, t0) = mount();
        c.toggle_mute(0).unwrap();
        c.fire_due(t0 + settle());
        assert!(!players[0].is_muted());
        assert!(players[1].is_muted());
    }

    #[test]
    fn progress_reports_percentage() {
        let (mut c, players, presenter, _) = mount();
        players[1].set_position(2.5);
        assert_eq!(c.on_progress(1).unwrap(), Some(25.0));
        assert_eq!(presenter.progress(1), Some(25.0));
    }

    #[test]
    fn progress_skips_unknown_duration() {
        let items = showcase_catalog();
        let players: Vec<MemoryPlayer> = items.iter().map(|_| MemoryPlayer::unloaded()).collect();
        let presenter = MemoryPresenter::new();
        let mut c = PlaybackController::mount(
            items,
            players,
            presenter.clone(),
            ShowcaseConfig::default(),
            Instant::now(),
        )
        .unwrap();
        assert_eq!(c.on_progress(0).unwrap(), None);
        assert_eq!(presenter.progress(0), None);
    }

    #[test]
    fn preload_covers_active_and_successor() {
        let (mut c, players, _, t0) = mount();
        c.set_active(11, t0).unwrap();
        for (i, p) in players.iter().enumerate() {
            let expected = if i == 11 || i == 0 { Preload::Auto } else { Preload::None };
            assert_eq!(p.preload(), expected, "item {}", i);
        }
    }

    #[test]
    fn failed_start_is_swallowed() {
        let (mut c, players, _, t0) = mount();
        players[0].fail_next_play(PlayError::NotAllowed("autoplay".into()));
        assert!(c.fire_due(t0 + settle()));
        assert_eq!(players[0].state(), MediaState::Paused);

        players[2].fail_next_play(PlayError::Aborted);
        c.set_active(2, t0 + settle()).unwrap();
        assert!(c.fire_due(t0 + settle() * 2));
        assert_eq!(c.playing_count(), 0);
    }

    #[test]
    fn teardown_cancels_pending_start() {
        let (mut c, players, _, t0) = mount();
        c.set_active(4, t0).unwrap();
        c.teardown();
        assert!(c.pending().is_none());
        assert!(!c.fire_due(t0 + settle() * 4));
        assert!(players.iter().all(|p| p.state() != MediaState::Playing));

        assert!(matches!(c.set_active(1, t0), Err(Error::Detached)));
        assert!(matches!(c.toggle_mute(1), Err(Error::Detached)));
        assert_eq!(c.active_index(), 4);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let (mut c, _, _, t0) = mount();
        let err = c.set_active(12, t0).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 12, len: 12 }));
        assert_eq!(c.active_index(), 0);
    }

    #[test]
    fn single_item_catalog_loops_on_itself() {
        let items = vec![MediaItem::new("Only", "Edit", "https://example/only.mp4")];
        let player = MemoryPlayer::new(3.0);
        let t0 = Instant::now();
        let mut c = PlaybackController::mount(
            items,
            vec![player.clone()],
            MemoryPresenter::new(),
            ShowcaseConfig::default(),
            t0,
        )
        .unwrap();
        c.fire_due(t0 + settle());
        player.set_position(3.0);
        c.on_playback_ended(0, t0 + Duration::from_secs(4)).unwrap();
        assert_eq!(c.active_index(), 0);
        c.fire_due(t0 + Duration::from_secs(5));
        assert_eq!(player.state(), MediaState::Playing);
        assert_eq!(player.position(), 0.0);
    }
}
