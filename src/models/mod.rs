pub mod candidate;
pub mod verdict;
pub mod scan_result;

pub use candidate::*;
pub use verdict::*;
pub use scan_result::*;
