//! Timed mock test: a synchronous state machine plus the async driver that
//! owns its timers.
//!
//! `TestSession` holds all rules and never sleeps. `TestDriver` runs one
//! tokio task that feeds it intents, countdown ticks and auto-advance
//! deadlines, and publishes a `SessionFrame` after every event.

mod driver;
mod frame;
mod machine;
mod notify;
mod service;
mod shuffle;

pub use driver::{Intent, TestDriver};
pub use frame::SessionFrame;
pub use machine::{AdvanceTicket, Phase, Step, TestSession};
pub use notify::{ChannelNotifier, Notice, Notifier, TracingNotifier};
pub use service::MockTestService;
pub use shuffle::ShuffleStrategy;
