use std::future;
use std::pin::Pin;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior, Sleep};
use tracing::debug;

use super::frame::SessionFrame;
use super::machine::{AdvanceTicket, Phase, Step, TestSession};
use crate::error::TestSessionError;

const COMMAND_BUFFER: usize = 32;
const TICK: Duration = Duration::from_secs(1);

/// A learner action forwarded to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Start,
    Select(usize),
    Skip,
    ToggleMark,
    Next,
    Previous,
    Jump(usize),
    End,
    Restart,
}

struct Command {
    intent: Intent,
    reply: oneshot::Sender<Step>,
}

/// Owns a `TestSession` on a background task and runs its timers.
///
/// Intents, countdown ticks and auto-advance deadlines are serialized through
/// one loop, so the session never sees concurrent mutation. Dropping the
/// driver stops the task and every timer with it.
pub struct TestDriver {
    commands: mpsc::Sender<Command>,
    frames: watch::Receiver<SessionFrame>,
    task: JoinHandle<()>,
}

impl TestDriver {
    /// Spawn the driver on the current tokio runtime.
    #[must_use]
    pub fn spawn(session: TestSession) -> Self {
        let (commands, inbox) = mpsc::channel(COMMAND_BUFFER);
        let (publisher, frames) = watch::channel(session.frame());
        let task = tokio::spawn(run(session, inbox, publisher));
        Self {
            commands,
            frames,
            task,
        }
    }

    /// Apply `intent` and wait for its outcome. The frame reflecting the
    /// change is published before this returns.
    ///
    /// # Errors
    ///
    /// Returns `TestSessionError::DriverClosed` if the task has stopped.
    pub async fn dispatch(&self, intent: Intent) -> Result<Step, TestSessionError> {
        let (reply, outcome) = oneshot::channel();
        self.commands
            .send(Command { intent, reply })
            .await
            .map_err(|_| TestSessionError::DriverClosed)?;
        outcome.await.map_err(|_| TestSessionError::DriverClosed)
    }

    /// Subscribe to frame updates.
    #[must_use]
    pub fn frames(&self) -> watch::Receiver<SessionFrame> {
        self.frames.clone()
    }

    /// The latest published frame.
    #[must_use]
    pub fn frame(&self) -> SessionFrame {
        self.frames.borrow().clone()
    }
}

impl Drop for TestDriver {
    fn drop(&mut self) {
        self.task.abort();
    }
}

//
// ─── LOOP ──────────────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct Timers {
    epoch: Option<u64>,
    countdown: Option<Interval>,
    advance: Option<(AdvanceTicket, Pin<Box<Sleep>>)>,
}

impl Timers {
    /// Align timers with the session: the countdown restarts whenever the
    /// epoch moves and the advance deadline follows the pending ticket.
    fn sync(&mut self, session: &TestSession) {
        if session.phase() != Phase::InProgress {
            *self = Self::default();
            return;
        }

        if self.countdown.is_none() || self.epoch != Some(session.epoch()) {
            let mut countdown = time::interval_at(Instant::now() + TICK, TICK);
            countdown.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.countdown = Some(countdown);
            self.epoch = Some(session.epoch());
        }

        match session.pending_advance() {
            None => self.advance = None,
            Some(ticket) if self.advance.as_ref().map(|(t, _)| *t) != Some(ticket) => {
                let deadline = time::sleep(session.settings().advance_delay());
                self.advance = Some((ticket, Box::pin(deadline)));
            }
            Some(_) => {}
        }
    }
}

async fn next_tick(countdown: &mut Option<Interval>) {
    match countdown {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending().await,
    }
}

async fn advance_due(advance: &mut Option<(AdvanceTicket, Pin<Box<Sleep>>)>) -> AdvanceTicket {
    match advance {
        Some((ticket, deadline)) => {
            deadline.as_mut().await;
            *ticket
        }
        None => future::pending().await,
    }
}

fn apply(session: &mut TestSession, intent: Intent) -> Step {
    match intent {
        Intent::Start => session.start(),
        Intent::Select(option) => session.select_answer(option),
        Intent::Skip => session.skip_question(),
        Intent::ToggleMark => session.toggle_mark_for_review(),
        Intent::Next => session.go_to_next(),
        Intent::Previous => session.go_to_previous(),
        Intent::Jump(index) => session.jump_to_question(index),
        Intent::End => session.end(),
        Intent::Restart => session.restart(),
    }
}

async fn run(
    mut session: TestSession,
    mut inbox: mpsc::Receiver<Command>,
    publisher: watch::Sender<SessionFrame>,
) {
    let mut timers = Timers::default();

    loop {
        timers.sync(&session);

        tokio::select! {
            command = inbox.recv() => {
                let Some(Command { intent, reply }) = command else {
                    debug!("session driver inbox closed");
                    break;
                };
                let step = apply(&mut session, intent);
                debug!(?intent, ?step, pointer = session.pointer(), "intent applied");
                publisher.send_replace(session.frame());
                let _ = reply.send(step);
            }
            () = next_tick(&mut timers.countdown) => {
                let step = session.tick();
                if step != Step::Applied || session.remaining() == session.budget() {
                    debug!(?step, pointer = session.pointer(), "countdown expired");
                }
                publisher.send_replace(session.frame());
            }
            ticket = advance_due(&mut timers.advance) => {
                timers.advance = None;
                let step = session.fire_advance(ticket);
                debug!(?step, pointer = session.pointer(), "auto-advance fired");
                publisher.send_replace(session.frame());
            }
        }
    }
}
