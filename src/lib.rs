pub mod aggregator;
pub mod analyzer;
pub mod cache;
pub mod chunker;
pub mod config;
pub mod error;
pub mod llm;
pub mod report;

pub use aggregator::Verdict;
pub use analyzer::DocumentAnalyzer;
pub use cache::AnalysisCache;
pub use config::Config;
pub use error::{AnalysisError, BackendError};
pub use llm::{ChunkFinding, LlmClient, SegmentAnalyzer};
pub use report::Reporter;

pub type Result<T> = anyhow::Result<T>;
