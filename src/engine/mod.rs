pub mod environment;
pub mod session;

pub use environment::EngineEnvironment;
pub use session::AnalysisSession;
