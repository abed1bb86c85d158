pub mod events;
pub mod interrupt;
pub mod orchestrator;

pub use events::ScanEvent;
pub use interrupt::spawn_interrupt_handler;
pub use orchestrator::{ScanOrchestrator, ScanOutcome, ScanServices};
