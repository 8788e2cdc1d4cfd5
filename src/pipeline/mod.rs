mod item;
mod runner;

pub use item::{
    ItemFailure, ItemOutcome, PlannedPlacement, RunConfiguration, RunSummary, Stage, WorkItem,
};
pub use runner::CategorizationPipeline;
