pub mod executor;
pub mod plan;

pub use executor::JoinExecutor;
pub use plan::{plan, EncodeJob, EncodePlan, PlannedStep, Stage};
