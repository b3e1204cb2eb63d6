mod catalog_vm;
mod dashboard_vm;
mod markdown_vm;
mod notice_vm;
mod results_vm;
mod test_vm;
mod time_fmt;

pub use catalog_vm::{CategoryOptionVm, QuizCardVm, map_category_options, map_quiz_cards};
pub use dashboard_vm::{AttemptCardVm, DashboardVm};
pub use markdown_vm::{markdown_to_html, markdown_to_plain, sanitize_html};
pub use notice_vm::notice_text;
pub use results_vm::{DifficultyRowVm, ItemStatus, ResultsVm, ReviewItemVm};
pub use test_vm::{ChipStatus, ChipVm, LOW_TIME_SECS, OptionMark, OptionRowVm, TestScreenVm};
pub use time_fmt::{format_countdown, format_datetime, format_elapsed};
