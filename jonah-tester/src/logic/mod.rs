pub mod playthrough;
pub mod reports;
pub mod tester;

pub use playthrough::{AnswerStrategy, Playthrough, describe_view};
pub use tester::*;
