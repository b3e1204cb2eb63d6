#![forbid(unsafe_code)]

pub mod category_service;
pub mod error;
pub mod question_bank_service;
pub mod quiz_service;
pub mod quiz_taking_service;
pub mod test_session;

pub use quiz_core::Clock;

pub use category_service::CategoryService;
pub use error::{
    CategoryServiceError, QuestionBankError, QuizServiceError, QuizTakingError, TestSessionError,
};
pub use question_bank_service::{DifficultyCounts, QuestionBankService};
pub use quiz_service::QuizService;
pub use quiz_taking_service::{Dashboard, QuizRun, QuizTakingService};
pub use test_session::{
    ChannelNotifier, Intent, MockTestService, Notice, Notifier, Phase, SessionFrame,
    ShuffleStrategy, Step, TestDriver, TestSession, TracingNotifier,
};
