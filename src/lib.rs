use shadow_rs::shadow;

shadow!(build);

// Internals
// ---------
pub mod data_structures;
pub(crate) mod search;

// Search space and problems
// -------------------------
pub mod cost;
pub mod environment;
pub mod error;

// Problems
// --------
pub mod problems;

// Algorithms
// ----------
pub mod algorithms;
pub mod engine;
pub mod result;
pub mod trace;

pub use algorithms::StrategyKind;
pub use engine::SearchConfig;
pub use engine::compare;
pub use engine::run;
pub use environment::Environment;
pub use environment::Path;
pub use environment::State;
pub use error::EnvironmentError;
pub use result::SearchResult;
pub use result::Termination;
pub use trace::Trace;
pub use trace::TraceStep;
