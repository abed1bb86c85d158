pub mod automatic;
pub mod interactive;
pub mod policy;

pub use automatic::{AutoPolicy, FixedPolicy};
pub use interactive::InteractivePolicy;
pub use policy::{DecisionPolicy, ForcePrompt, RedirectPrompt};
