pub mod orchestrator;

pub use orchestrator::{
    AnalysisOrchestrator, AnalysisReport, OrchestratorError, SkippedSymbol, SymbolError,
};
