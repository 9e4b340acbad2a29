pub mod boundary;
pub mod chapter_unit;
pub mod completion;
pub mod header;
pub mod intro;
pub mod navigation;
pub mod question_input;
pub mod transition;
