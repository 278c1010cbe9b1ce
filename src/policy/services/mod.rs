//! Policy evaluation services.

mod engine;
mod settings;

pub use engine::PolicyEngine;
pub use settings::PolicySettings;
