pub mod scenario;
mod util;

pub use util::{report_timestamp, split_csv};
