pub mod comparator;
pub mod pacing;

pub use comparator::OriginComparator;
pub use pacing::RequestPacer;
