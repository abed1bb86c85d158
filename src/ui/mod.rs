pub mod banner;
pub mod progress;
pub mod prompt;
pub mod status;

pub use banner::print_banner;
pub use progress::ScanProgress;
pub use prompt::ask_yes_no;
pub use status::{format_result_line, print_summary};
