use courier_domain::{LoggingSettings, Severity};
use courier_logger::Logger;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn settings_with_a_path_write_json_lines() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");
    let settings = LoggingSettings {
        console: false,
        path: Some(log_dir.clone()),
        json: true,
        ..LoggingSettings::default()
    };

    let logger = Logger::builder("integration-file-logging")
        .settings(&settings, Severity::Info)
        .init()?;
    assert!(logger.writes_files());

    tracing::info!(endpoint = "orders", "hello from integration test");
    tracing::debug!("filtered out at info");

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(&log_file)?;
    assert!(contents.contains("hello from integration test"), "{contents}");
    assert!(!contents.contains("filtered out at info"), "{contents}");
    assert!(contents.lines().all(|line| line.starts_with('{')), "{contents}");

    Ok(())
}
