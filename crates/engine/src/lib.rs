pub mod analysis;
pub mod lifecycle;
pub mod scheduler;
pub mod sizing;
pub mod state;

pub use analysis::{analyze_pair, PairAnalysis};
pub use lifecycle::BotWorker;
pub use scheduler::{PairStrategy, Scheduler, SchedulerConfig, StrategySource, TickOutcome};
pub use state::RiskState;
