use tokio::sync::mpsc;
use tracing::info;

/// Side-channel messages for the learner. Delivery never blocks the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    ProgressRestored,
    AnswerCorrect,
    AnswerIncorrect { correct_option: usize },
    TimeUp,
    Unanswered { count: usize },
    Completed { score: u32, total: usize },
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        info!(?notice, "session notice");
    }
}

/// Forwards notices to an unbounded channel; a dropped receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        let _ = self.tx.send(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_delivers_in_order_and_survives_closed_receiver() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.notify(Notice::TimeUp);
        notifier.notify(Notice::AnswerIncorrect { correct_option: 2 });
        assert_eq!(rx.try_recv().unwrap(), Notice::TimeUp);
        assert_eq!(
            rx.try_recv().unwrap(),
            Notice::AnswerIncorrect { correct_option: 2 }
        );
        drop(rx);
        notifier.notify(Notice::ProgressRestored);
    }
}
