use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

/// Console output helper. All user-facing printing goes through here so
/// color handling stays in one place; diagnostics go to stderr, results
/// to stdout.
pub struct Ui {
    colors_enabled: bool,
}

impl Ui {
    pub fn new(colors_enabled: bool) -> Self {
        Self { colors_enabled }
    }

    pub fn print_header(&self, title: &str) {
        if self.colors_enabled {
            println!("\n{}", format!("=== {} ===", title).cyan().bold());
        } else {
            println!("\n=== {} ===", title);
        }
    }

    pub fn print_info(&self, message: &str) {
        println!("{}", message);
    }

    pub fn print_success(&self, message: &str) {
        if self.colors_enabled {
            println!("{} {}", "✓".green().bold(), message);
        } else {
            println!("✓ {}", message);
        }
    }

    pub fn print_warning(&self, message: &str) {
        if self.colors_enabled {
            eprintln!("{} {}", "⚠".yellow().bold(), message);
        } else {
            eprintln!("⚠ {}", message);
        }
    }

    pub fn print_error(&self, message: &str) {
        if self.colors_enabled {
            eprintln!("{} {}", "✗".red().bold(), message);
        } else {
            eprintln!("✗ {}", message);
        }
    }

    /// Progress bar for directory reviews, one tick per finished file.
    pub fn create_review_progress(&self, total: u64) -> ProgressBar {
        let bar = ProgressBar::new(total);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} files {msg}",
        )
        .map(|style| style.progress_chars("=> "))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar
    }
}
