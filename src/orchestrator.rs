use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use indicatif::ProgressBar;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::agent::ReviewAgent;
use crate::config::CliConfig;
use crate::report::ReviewReport;
use crate::review::run_review;
use crate::scanner::SourceScanner;

/// What happened to one file during a directory review.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub outcome: ReviewOutcome,
}

#[derive(Debug, Clone)]
pub enum ReviewOutcome {
    Success(Box<ReviewReport>),
    Failure(String),
}

impl ReviewOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ReviewOutcome::Success(_))
    }
}

/// Fans one review per file out over a bounded pool. Results come back
/// in completion order, one entry per input file; a failed file becomes
/// a tagged failure instead of aborting the rest.
pub struct ProjectReviewer {
    agent: Arc<ReviewAgent>,
    scanner: SourceScanner,
    concurrency: usize,
}

impl ProjectReviewer {
    pub fn new(agent: Arc<ReviewAgent>, config: &CliConfig) -> Self {
        Self {
            agent,
            scanner: SourceScanner::from_config(config),
            concurrency: config.review.concurrency.max(1),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn scan(&self, root: &Path) -> Vec<PathBuf> {
        self.scanner.scan(root)
    }

    /// Scan `root` and review everything found.
    pub async fn run(&self, root: &Path) -> Vec<FileOutcome> {
        let files = self.scan(root);
        self.review_files(files, None).await
    }

    /// Review the given files, at most `concurrency` at a time. The
    /// progress bar, when present, ticks once per finished file.
    pub async fn review_files(
        &self,
        files: Vec<PathBuf>,
        progress: Option<&ProgressBar>,
    ) -> Vec<FileOutcome> {
        debug!(
            "reviewing {} files with concurrency {}",
            files.len(),
            self.concurrency
        );
        let semaphore = Semaphore::new(self.concurrency);
        let mut pending = FuturesUnordered::new();
        for path in files {
            let semaphore = &semaphore;
            let agent = &self.agent;
            pending.push(async move {
                let outcome = match semaphore.acquire().await {
                    Ok(_permit) => match run_review(&path, agent).await {
                        Ok(report) => ReviewOutcome::Success(Box::new(report)),
                        Err(err) => ReviewOutcome::Failure(format!("{:#}", err)),
                    },
                    Err(_) => ReviewOutcome::Failure("review pool closed".to_string()),
                };
                FileOutcome { path, outcome }
            });
        }

        let mut outcomes = Vec::with_capacity(pending.len());
        while let Some(finished) = pending.next().await {
            if let ReviewOutcome::Failure(reason) = &finished.outcome {
                warn!("error reviewing {}: {}", finished.path.display(), reason);
            }
            if let Some(bar) = progress {
                bar.inc(1);
            }
            outcomes.push(finished);
        }
        outcomes
    }
}
