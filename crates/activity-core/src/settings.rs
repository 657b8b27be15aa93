use clap::Parser;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{ActivityError, Result};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Chart per-participant activity from an exported chat log
#[derive(Parser, Debug, Clone)]
#[command(
    name = "chat-activity",
    about = "Chart per-participant activity from an exported chat log",
    version
)]
pub struct Settings {
    /// Exported chat log (UTF-8 text, one message per line)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Destination PDF report
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// HTML report path from older invocations; accepted and ignored
    #[arg(value_name = "LEGACY_HTML")]
    pub legacy_html: Option<PathBuf>,

    /// Page size of the report (landscape)
    #[arg(long, env = "CHAT_ACTIVITY_PAGE_SIZE", default_value = "a4", value_parser = ["a4", "letter"])]
    pub page_size: String,

    /// Also write the aggregate tables as JSON
    #[arg(long, value_name = "PATH")]
    pub summary_json: Option<PathBuf>,

    /// Logging level
    #[arg(long, env = "CHAT_ACTIVITY_LOG_LEVEL", default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path (logs go to stderr when absent)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── PageSize ───────────────────────────────────────────────────────────────────

/// Landscape page geometry in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize {
    pub width: u32,
    pub height: u32,
}

impl PageSize {
    pub const A4_LANDSCAPE: PageSize = PageSize {
        width: 842,
        height: 595,
    };
    pub const LETTER_LANDSCAPE: PageSize = PageSize {
        width: 792,
        height: 612,
    };

    /// Resolve a `--page-size` value.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "a4" => Ok(Self::A4_LANDSCAPE),
            "letter" => Ok(Self::LETTER_LANDSCAPE),
            other => Err(ActivityError::Config(format!(
                "unknown page size \"{}\" (expected a4 or letter)",
                other
            ))),
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4_LANDSCAPE
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments and apply `--debug`.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os().collect())
    }

    /// Same as [`load`](Self::load) but with an explicit argument list,
    /// enabling unit-testing without spawning subprocesses.
    pub fn load_from_args(args: Vec<OsString>) -> Self {
        Self::resolve(Settings::parse_from(args))
    }

    /// `--debug` overrides the log level.
    fn resolve(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Reject combinations that can only end badly before any work starts.
    pub fn validate(&self) -> Result<()> {
        let input = resolved(&self.input);
        let output = resolved(&self.output);
        if output == input {
            return Err(ActivityError::Config(format!(
                "output path {} is the input file",
                self.output.display()
            )));
        }
        if let Some(summary) = &self.summary_json {
            let summary_path = resolved(summary);
            if summary_path == output || summary_path == input {
                return Err(ActivityError::Config(format!(
                    "summary path {} collides with the input or the report",
                    summary.display()
                )));
            }
        }
        PageSize::from_name(&self.page_size)?;
        Ok(())
    }

    pub fn page(&self) -> Result<PageSize> {
        PageSize::from_name(&self.page_size)
    }
}

/// Absolute form of `path` with `..` and symlinks resolved. A file that does
/// not exist yet is resolved through its parent directory; anything else is
/// compared as given.
fn resolved(path: &Path) -> PathBuf {
    if let Ok(full) = std::fs::canonicalize(path) {
        return full;
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (std::fs::canonicalize(parent), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
