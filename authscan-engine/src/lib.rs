pub mod engine;

pub use engine::{open_lookup, EngineError, ReportRuntime};
