mod error;
mod lookup;
mod runtime;

pub use self::{error::EngineError, lookup::open_lookup, runtime::ReportRuntime};
