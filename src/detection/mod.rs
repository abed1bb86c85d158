pub mod classifier;
pub mod signatures;

pub use classifier::ProtectionClassifier;
pub use signatures::{ProviderSignature, SIGNATURES};
