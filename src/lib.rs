//! SonifAI server library
//!
//! Music analysis through a generative model, local variations over the
//! resulting analysis, and text-to-music prompt generation.

pub mod analysis;
pub mod cli_style;
pub mod config;
pub mod llm;
pub mod metadata;
pub mod requester;
pub mod server;
pub mod session;
pub mod source;

// Re-export commonly used types for convenience
pub use analysis::{Analysis, AnalysisResult, VariationParams};
pub use requester::{AnalysisRequester, RequesterSettings};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
pub use session::AnalysisSession;
