pub mod cli;
pub mod config;
pub mod decision;
pub mod detection;
pub mod enumeration;
pub mod errors;
pub mod models;
pub mod net;
pub mod origin;
pub mod pipeline;
pub mod reporting;
pub mod session;
pub mod ui;
pub mod utils;
