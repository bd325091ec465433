pub mod agent;
pub mod cli;
pub mod cli_types;
pub mod config;
pub mod extract;
pub mod ollama;
pub mod openai;
pub mod orchestrator;
pub mod prompts;
pub mod report;
pub mod review;
pub mod scanner;
pub mod ui;

// Re-export commonly used types
pub use agent::{ChatBackend, ReviewAgent};
pub use cli::CliApp;
pub use config::{BackendKind, CliConfig};
pub use extract::{
    extract_and_parse, select_candidate, CandidateSource, ExtractError, ExtractErrorKind,
};
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;
pub use orchestrator::{FileOutcome, ProjectReviewer, ReviewOutcome};
pub use report::{
    render_markdown, save_json_report, save_markdown_report, BugFinding, Optimization,
    ReviewReport,
};
pub use review::run_review;
pub use scanner::{detect_language, scan_directory, SourceScanner};
pub use ui::Ui;

/// Crate version, exposed for diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
