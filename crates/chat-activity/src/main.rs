mod bootstrap;

use activity_core::settings::Settings;
use activity_data::analysis::analyze_chat;
use activity_report::{RenderedReport, ReportRenderer};
use anyhow::Result;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Chat Activity v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Input: {}, Output: {}, Page size: {}",
        settings.input.display(),
        settings.output.display(),
        settings.page_size
    );

    match run(&settings) {
        Ok(report) => {
            tracing::info!("Done: {} pages in {}", report.pages, report.path.display());
            Ok(())
        }
        Err(err) => {
            tracing::error!("{:#}", err);
            Err(err)
        }
    }
}

/// Parse, aggregate, render and write, in that order. The report is only
/// replaced once every page has been drawn.
fn run(settings: &Settings) -> Result<RenderedReport> {
    settings.validate()?;
    let page_size = settings.page()?;

    if let Some(legacy) = &settings.legacy_html {
        tracing::warn!(
            "Ignoring legacy HTML path {}; the report is written as PDF only",
            legacy.display()
        );
    }

    let analysis = analyze_chat(&settings.input)?;
    let report = ReportRenderer::new(page_size).render(&analysis.aggregates, &settings.output)?;

    if let Some(summary) = &settings.summary_json {
        analysis.write_summary(summary)?;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use activity_core::error::ActivityError;
    use std::ffi::OsString;
    use std::path::Path;
    use tempfile::TempDir;

    const CHAT: &str = "01/01/23, 09:00 - Alice: hi\n\
                        01/01/23, 09:05 - Bob: hello\n\
                        01/01/23, 10:00 - Alice: again\n\
                        not a valid chat line\n";

    fn settings(args: &[&Path]) -> Settings {
        let mut argv: Vec<OsString> = vec!["chat-activity".into()];
        argv.extend(args.iter().map(|p| p.as_os_str().to_os_string()));
        Settings::load_from_args(argv)
    }

    fn activity_error(err: &anyhow::Error) -> &ActivityError {
        err.downcast_ref::<ActivityError>().expect("ActivityError")
    }

    #[test]
    fn test_run_writes_three_page_report() {
        let tmp = TempDir::new().expect("tempdir");
        let input = tmp.path().join("Chat.txt");
        let output = tmp.path().join("report.pdf");
        std::fs::write(&input, CHAT).unwrap();

        let report = run(&settings(&[&input, &output])).unwrap();
        assert_eq!(report.pages, 3);

        let doc = lopdf::Document::load(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_run_accepts_legacy_html_argument() {
        let tmp = TempDir::new().expect("tempdir");
        let input = tmp.path().join("Chat.txt");
        let output = tmp.path().join("report.pdf");
        let legacy = tmp.path().join("report.html");
        std::fs::write(&input, CHAT).unwrap();

        run(&settings(&[&input, &output, &legacy])).unwrap();
        assert!(output.is_file());
        assert!(!legacy.exists());
    }

    #[test]
    fn test_run_writes_summary_json() {
        let tmp = TempDir::new().expect("tempdir");
        let input = tmp.path().join("Chat.txt");
        let output = tmp.path().join("report.pdf");
        let summary = tmp.path().join("summary.json");
        std::fs::write(&input, CHAT).unwrap();

        let mut s = settings(&[&input, &output]);
        s.summary_json = Some(summary.clone());
        run(&s).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&summary).unwrap()).unwrap();
        assert_eq!(json["total_messages"], 3);
    }

    #[test]
    fn test_run_missing_input_writes_nothing() {
        let tmp = TempDir::new().expect("tempdir");
        let input = tmp.path().join("missing.txt");
        let output = tmp.path().join("report.pdf");

        let err = run(&settings(&[&input, &output])).unwrap_err();
        assert!(matches!(activity_error(&err), ActivityError::InputNotFound(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_run_without_messages_keeps_previous_report() {
        let tmp = TempDir::new().expect("tempdir");
        let input = tmp.path().join("Chat.txt");
        let output = tmp.path().join("report.pdf");
        std::fs::write(&input, "not a valid chat line\n").unwrap();
        std::fs::write(&output, b"previous").unwrap();

        let err = run(&settings(&[&input, &output])).unwrap_err();
        assert!(matches!(
            activity_error(&err),
            ActivityError::NoMatchingMessages(_)
        ));
        assert_eq!(std::fs::read(&output).unwrap(), b"previous");
    }

    #[test]
    fn test_run_rejects_output_equal_to_input() {
        let tmp = TempDir::new().expect("tempdir");
        let input = tmp.path().join("Chat.txt");
        std::fs::write(&input, CHAT).unwrap();

        let err = run(&settings(&[&input, &input])).unwrap_err();
        assert!(matches!(activity_error(&err), ActivityError::Config(_)));
        assert_eq!(std::fs::read_to_string(&input).unwrap(), CHAT);
    }
}
