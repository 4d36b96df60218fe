pub mod config;
pub mod descriptors;
pub mod evaluator;
pub mod indicators;

pub use config::{StrategyConfig, StrategyFileConfig, StrategyKind};
pub use descriptors::{available_strategies, ParamSpec, StrategyDescriptor};
pub use evaluator::{analyze, get_signal, min_history, Analysis, AnalysisDetail};
