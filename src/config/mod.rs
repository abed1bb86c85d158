pub mod parser;
pub mod schema;
pub mod types;
pub mod credentials;

pub use types::*;
pub use parser::parse_config;
pub use credentials::resolve_credential;
