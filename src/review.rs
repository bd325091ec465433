use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::agent::ReviewAgent;
use crate::report::{BugFinding, Optimization, ReviewReport};
use crate::scanner;

/// Review one file: bug detection, then optimization scan, then a
/// summary of the counts. Failing queries degrade to warnings on the
/// report; only an unreadable or unsupported file is an error.
pub async fn run_review(path: &Path, agent: &ReviewAgent) -> Result<ReviewReport> {
    let code = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let language = scanner::detect_language(path)
        .ok_or_else(|| anyhow!("unsupported file type: {}", path.display()))?;
    debug!("reviewing {} as {}", path.display(), language);

    let mut warnings = Vec::new();

    let bug_reply = agent.detect_bugs(&code, language).await;
    let bugs: Vec<BugFinding> =
        decode_findings(&bug_reply, "bugs", "bug detection", &mut warnings);

    let opt_reply = agent.suggest_optimizations(&code, language).await;
    let optimizations: Vec<Optimization> =
        decode_findings(&opt_reply, "optimizations", "optimization scan", &mut warnings);

    let summary = agent.generate_summary(bugs.len(), optimizations.len()).await;

    Ok(ReviewReport {
        file: path.to_path_buf(),
        language: language.to_string(),
        model: agent.model().to_string(),
        generated_at: Local::now().to_rfc3339(),
        bugs,
        optimizations,
        summary,
        warnings,
    })
}

/// Pull a findings list out of a query reply. Error records and replies
/// in the wrong shape turn into a warning plus an empty list; model
/// output is never trusted enough to abort on.
fn decode_findings<T: DeserializeOwned>(
    reply: &Value,
    key: &str,
    section: &str,
    warnings: &mut Vec<String>,
) -> Vec<T> {
    if let Some(error) = reply.get("error").and_then(Value::as_str) {
        warnings.push(format!("{} failed: {}", section, error));
        return Vec::new();
    }
    match reply.get(key) {
        Some(found) => match serde_json::from_value(found.clone()) {
            Ok(items) => items,
            Err(err) => {
                warnings.push(format!(
                    "{} reply had an unexpected \"{}\" shape: {}",
                    section, key, err
                ));
                Vec::new()
            }
        },
        None => {
            warnings.push(format!("{} reply had no \"{}\" field", section, key));
            Vec::new()
        }
    }
}
