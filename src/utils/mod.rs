pub mod domain;
pub mod formatting;
pub mod similarity;
pub mod truncation;
