use log::debug;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};

use super::controller::{PlaybackController, ShowcaseEvent};
use super::player::{MediaState, Player, Presenter};
use crate::{Error, Result};

enum Command {
    Event(ShowcaseEvent, oneshot::Sender<Result<()>>),
    ToggleMute(usize, oneshot::Sender<Result<bool>>),
    Progress(usize, oneshot::Sender<Result<Option<f64>>>),
    Snapshot(oneshot::Sender<ShowcaseSnapshot>),
    Close(oneshot::Sender<ShowcaseSnapshot>),
}

/// Point-in-time view of the controller
#[derive(Debug, Clone, PartialEq)]
pub struct ShowcaseSnapshot {
    pub active_index: usize,
    pub muted: Vec<bool>,
    pub states: Vec<MediaState>,
    pub pending_index: Option<usize>,
    pub attached: bool,
}

impl ShowcaseSnapshot {
    fn of<P: Player, S: Presenter>(c: &PlaybackController<P, S>) -> Self {
        Self {
            active_index: c.active_index(),
            muted: c.state().muted_flags().to_vec(),
            states: c.players().iter().map(|p| p.state()).collect(),
            pending_index: c.pending().map(|p| p.index),
            attached: c.is_attached(),
        }
    }

    pub fn playing(&self) -> Vec<usize> {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == MediaState::Playing)
            .map(|(i, _)| i)
            .collect()
    }
}

/// An async handle to a controller running on its own tokio task.
///
/// The task owns the controller and is the only thing that touches it, so
/// events are applied one at a time in arrival order. The settle delay is a
/// deadline the task waits on alongside the command channel; a command that
/// arrives first simply replaces it.
#[derive(Clone)]
pub struct Showcase {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl Showcase {
    /// Move `controller` onto a new task. Must be called inside a tokio
    /// runtime.
    pub fn spawn<P, S>(controller: PlaybackController<P, S>) -> Self
    where
        P: Player + 'static,
        S: Presenter + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        tokio::spawn(run(controller, cmd_rx));
        Self { cmd_tx }
    }

    /// The user picked card `index`
    pub async fn select(&self, index: usize) -> Result<()> {
        self.event(ShowcaseEvent::Select(index)).await
    }

    /// Card `index` reached the end of its media
    pub async fn ended(&self, index: usize) -> Result<()> {
        self.event(ShowcaseEvent::Ended(index)).await
    }

    pub async fn toggle_mute(&self, index: usize) -> Result<bool> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::ToggleMute(index, tx))?;
        rx.await.map_err(|_| Error::Detached)?
    }

    pub async fn progress(&self, index: usize) -> Result<Option<f64>> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Progress(index, tx))?;
        rx.await.map_err(|_| Error::Detached)?
    }

    pub async fn snapshot(&self) -> Result<ShowcaseSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx))?;
        rx.await.map_err(|_| Error::Detached)
    }

    /// Tear the controller down and stop the task. Returns the final state.
    pub async fn close(self) -> Result<ShowcaseSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Close(tx))?;
        rx.await.map_err(|_| Error::Detached)
    }

    async fn event(&self, event: ShowcaseEvent) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Event(event, tx))?;
        rx.await.map_err(|_| Error::Detached)?
    }

    fn send(&self, cmd: Command) -> Result<()> {
        self.cmd_tx.send(cmd).map_err(|_| Error::Detached)
    }
}

async fn run<P: Player, S: Presenter>(
    mut controller: PlaybackController<P, S>,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
) {
    loop {
        let deadline = controller.next_deadline();
        tokio::select! {
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else {
                    debug!("showcase: all handles dropped, tearing down");
                    controller.teardown();
                    return;
                };
                match cmd {
                    Command::Event(event, resp) => {
                        let _ = resp.send(controller.dispatch(event, Instant::now()));
                    }
                    Command::ToggleMute(index, resp) => {
                        let _ = resp.send(controller.toggle_mute(index));
                    }
                    Command::Progress(index, resp) => {
                        let _ = resp.send(controller.on_progress(index));
                    }
                    Command::Snapshot(resp) => {
                        let _ = resp.send(ShowcaseSnapshot::of(&controller));
                    }
                    Command::Close(resp) => {
                        controller.teardown();
                        let _ = resp.send(ShowcaseSnapshot::of(&controller));
                        return;
                    }
                }
            }
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                controller.fire_due(Instant::now());
            }
        }
    }
}
