//! Presentation mapping for the quiz front ends.
//!
//! Everything here is a pure function from service read models to display
//! structs; rendering is left to the binary.

#![forbid(unsafe_code)]

pub mod vm;

pub use vm::{
    AttemptCardVm, CategoryOptionVm, ChipStatus, ChipVm, DashboardVm, DifficultyRowVm,
    ItemStatus, OptionMark, OptionRowVm, QuizCardVm, ResultsVm, ReviewItemVm, TestScreenVm,
    notice_text,
};
