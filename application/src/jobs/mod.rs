pub mod progress;
pub mod registry;
