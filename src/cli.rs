use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::agent::ReviewAgent;
use crate::config::CliConfig;
use crate::orchestrator::{ProjectReviewer, ReviewOutcome};
use crate::report::{save_json_report, save_markdown_report, ReviewReport};
use crate::review::run_review;
use crate::ui::Ui;

/// CLI application: owns the configuration, the agent, and the console
/// output, and dispatches on what kind of path it was given.
pub struct CliApp {
    config: CliConfig,
    agent: Arc<ReviewAgent>,
    ui: Ui,
    verbose: bool,
}

impl CliApp {
    pub fn new(config: CliConfig, verbose: bool, colors_enabled: bool) -> Result<Self> {
        let agent = Arc::new(
            ReviewAgent::from_config(&config).context("failed to initialize model backend")?,
        );
        Ok(Self::with_agent(config, agent, verbose, colors_enabled))
    }

    /// Build around an existing agent. `new` is the normal path; this
    /// exists so callers can supply their own backend.
    pub fn with_agent(
        config: CliConfig,
        agent: Arc<ReviewAgent>,
        verbose: bool,
        colors_enabled: bool,
    ) -> Self {
        info!(
            "initialized with {} backend, model {}",
            agent.backend_name(),
            agent.model()
        );
        Self {
            config,
            agent,
            ui: Ui::new(colors_enabled),
            verbose,
        }
    }

    /// Review the given path: a single file directly, a directory via
    /// the concurrent reviewer.
    pub async fn run(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            bail!("Path not found: {}", path.display());
        }
        if path.is_file() {
            self.review_file(path).await
        } else if path.is_dir() {
            self.review_project(path).await
        } else {
            bail!(
                "Invalid path: {} is neither a file nor a directory",
                path.display()
            );
        }
    }

    async fn review_file(&self, path: &Path) -> Result<()> {
        self.ui.print_header("Code Review");
        if self.verbose {
            self.ui
                .print_info(&format!("Backend: {}", self.agent.backend_name()));
            self.ui.print_info(&format!("Model: {}", self.agent.model()));
        }
        self.ui.print_info(&format!("Reviewing {}...", path.display()));

        let report = run_review(path, &self.agent).await?;
        self.print_report_summary(&report);
        let (json_path, md_path) = self.save_reports(&report)?;
        self.ui.print_success(&format!(
            "Reports saved: {} and {}",
            json_path.display(),
            md_path.display()
        ));
        Ok(())
    }

    async fn review_project(&self, dir: &Path) -> Result<()> {
        self.ui.print_header("Project Review");
        let reviewer = ProjectReviewer::new(self.agent.clone(), &self.config);
        let files = reviewer.scan(dir);
        if files.is_empty() {
            self.ui.print_warning(&format!(
                "No supported source files found under {}",
                dir.display()
            ));
            return Ok(());
        }

        self.ui.print_info(&format!(
            "Found {} source files (reviewing up to {} at a time)",
            files.len(),
            self.config.review.concurrency.max(1)
        ));
        let progress = self.ui.create_review_progress(files.len() as u64);
        let outcomes = reviewer.review_files(files, Some(&progress)).await;
        progress.finish_and_clear();

        let mut failed = 0usize;
        for outcome in &outcomes {
            match &outcome.outcome {
                // A report that cannot be written counts as that file's
                // failure; the rest of the listing still runs.
                ReviewOutcome::Success(report) => match self.save_reports(report) {
                    Ok((json_path, md_path)) => {
                        self.ui.print_success(&format!(
                            "{} ({} bugs, {} optimizations)",
                            outcome.path.display(),
                            report.bugs.len(),
                            report.optimizations.len()
                        ));
                        if self.verbose {
                            self.ui.print_info(&format!(
                                "    reports: {}, {}",
                                json_path.display(),
                                md_path.display()
                            ));
                        }
                    }
                    Err(err) => {
                        failed += 1;
                        self.ui.print_error(&format!(
                            "{}: failed to save reports: {:#}",
                            outcome.path.display(),
                            err
                        ));
                    }
                },
                ReviewOutcome::Failure(reason) => {
                    failed += 1;
                    self.ui
                        .print_error(&format!("{}: {}", outcome.path.display(), reason));
                }
            }
        }

        let reviewed = outcomes.len() - failed;
        if failed > 0 {
            self.ui.print_warning(&format!(
                "Reviewed {} of {} files; {} failed",
                reviewed,
                outcomes.len(),
                failed
            ));
        } else {
            self.ui
                .print_success(&format!("Reviewed all {} files", outcomes.len()));
        }
        Ok(())
    }

    fn save_reports(&self, report: &ReviewReport) -> Result<(PathBuf, PathBuf)> {
        let json_path = save_json_report(report, &self.config.output.dir)?;
        let md_path = save_markdown_report(report, &self.config.output.dir)?;
        Ok((json_path, md_path))
    }

    fn print_report_summary(&self, report: &ReviewReport) {
        self.ui.print_header("Review Summary");
        self.ui.print_info(&format!("File: {}", report.file.display()));
        self.ui.print_info(&format!("Language: {}", report.language));

        self.ui
            .print_info(&format!("\nBugs found: {}", report.bugs.len()));
        for bug in &report.bugs {
            let severity = bug.severity.as_deref().unwrap_or("unspecified");
            match bug.line {
                Some(line) => self.ui.print_info(&format!(
                    "  - [{}] line {}: {}",
                    severity, line, bug.description
                )),
                None => self
                    .ui
                    .print_info(&format!("  - [{}] {}", severity, bug.description)),
            }
        }

        self.ui
            .print_info(&format!("\nOptimizations: {}", report.optimizations.len()));
        for opt in &report.optimizations {
            let impact = opt.impact.as_deref().unwrap_or("unspecified");
            self.ui
                .print_info(&format!("  - [{}] {}", impact, opt.description));
        }

        if !report.summary.is_empty() {
            self.ui
                .print_info(&format!("\nSummary: {}", report.summary));
        }
        for warning in &report.warnings {
            self.ui.print_warning(warning);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ChatBackend;
    use crate::config::BackendKind;
    use async_trait::async_trait;
    use std::fs;
    use tempfile::TempDir;

    struct CannedBackend;

    #[async_trait]
    impl ChatBackend for CannedBackend {
        fn name(&self) -> &'static str {
            "canned"
        }

        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(r#"{"bugs": [], "optimizations": []}"#.to_string())
        }
    }

    fn create_test_app(output_dir: &Path) -> CliApp {
        let mut config = CliConfig::default();
        config.output.dir = output_dir.to_path_buf();
        config.review.concurrency = 2;
        let agent = Arc::new(ReviewAgent::new(Box::new(CannedBackend), "test-model"));
        CliApp::with_agent(config, agent, false, false)
    }

    #[tokio::test]
    async fn test_run_missing_path_fails() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(dir.path());

        let err = app.run(&dir.path().join("absent")).await.unwrap_err();
        assert!(format!("{:#}", err).contains("Path not found"));
    }

    #[tokio::test]
    async fn test_run_single_file_writes_both_reports() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("reports");
        let app = create_test_app(&out);

        let file = dir.path().join("app.py");
        fs::write(&file, "x = 1\n").unwrap();
        app.run(&file).await.unwrap();

        let written: Vec<_> = fs::read_dir(&out)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(written.len(), 2);
        assert!(written.iter().any(|p| p.extension().unwrap() == "json"));
        assert!(written.iter().any(|p| p.extension().unwrap() == "md"));
    }

    #[tokio::test]
    async fn test_run_directory_writes_reports_per_success() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("reports");
        let app = create_test_app(&out);

        let tree = dir.path().join("project");
        fs::create_dir(&tree).unwrap();
        fs::write(tree.join("a.py"), "x = 1\n").unwrap();
        fs::write(tree.join("b.js"), "let y = 2;\n").unwrap();
        app.run(&tree).await.unwrap();

        let written = fs::read_dir(&out).unwrap().count();
        assert_eq!(written, 4);
    }

    #[tokio::test]
    async fn test_run_directory_with_failures_still_succeeds() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("reports");
        let app = create_test_app(&out);

        let tree = dir.path().join("project");
        fs::create_dir(&tree).unwrap();
        fs::write(tree.join("good.py"), "x = 1\n").unwrap();
        fs::write(tree.join("bad.py"), [0xffu8, 0xfe]).unwrap();
        app.run(&tree).await.unwrap();

        // Only the readable file gets reports.
        let written = fs::read_dir(&out).unwrap().count();
        assert_eq!(written, 2);
    }

    #[tokio::test]
    async fn test_run_directory_continues_when_reports_cannot_be_saved() {
        let dir = TempDir::new().unwrap();
        // Occupy the output path with a plain file so every save fails.
        let out = dir.path().join("reports");
        fs::write(&out, "occupied").unwrap();
        let app = create_test_app(&out);

        let tree = dir.path().join("project");
        fs::create_dir(&tree).unwrap();
        fs::write(tree.join("a.py"), "x = 1\n").unwrap();
        fs::write(tree.join("b.py"), "y = 2\n").unwrap();

        app.run(&tree).await.unwrap();
        assert!(out.is_file());
    }

    #[tokio::test]
    async fn test_run_single_file_save_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("reports");
        fs::write(&out, "occupied").unwrap();
        let app = create_test_app(&out);

        let file = dir.path().join("app.py");
        fs::write(&file, "x = 1\n").unwrap();
        let err = app.run(&file).await.unwrap_err();
        assert!(format!("{:#}", err).contains("report"));
    }

    #[tokio::test]
    async fn test_run_empty_directory_is_ok_and_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("reports");
        let app = create_test_app(&out);

        let tree = dir.path().join("empty");
        fs::create_dir(&tree).unwrap();
        app.run(&tree).await.unwrap();
        assert!(!out.exists());
    }

    #[test]
    fn test_new_rejects_openai_backend_without_key() {
        let mut config = CliConfig::default();
        config.backend = BackendKind::OpenAi;
        if std::env::var("OPENAI_API_KEY").is_err() {
            let err = CliApp::new(config, false, false).err().unwrap();
            assert!(format!("{:#}", err).contains("model backend"));
        }
    }

    #[test]
    fn test_new_with_default_config_succeeds() {
        let app = CliApp::new(CliConfig::default(), true, true);
        assert!(app.is_ok());
    }
}
