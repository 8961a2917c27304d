//! Attribution through a real stack capture
//!
//! Test binaries carry debug info, so the backtrace inspector can see this
//! file's frames.

use std::sync::Arc;

use std::fs;

use sitelog_core::config::LoggerSettings;
use sitelog_core::{log_info, Logger, Loggers, MemorySink};
use tempfile::tempdir;

fn attributed_logger(file: Arc<MemorySink>) -> Logger {
    Logger::builder("attribution")
        .attribute_to(env!("CARGO_MANIFEST_DIR"))
        .sink(file)
        .build()
}

fn attribution_line(record: &str) -> String {
    record.lines().nth(1).unwrap_or_default().trim().to_string()
}

#[test]
fn test_attributes_to_calling_line() {
    let file = Arc::new(MemorySink::persistent());
    let logger = attributed_logger(file.clone());

    let line = line!() + 1;
    logger.info("from the test").unwrap();

    let attribution = attribution_line(&file.records()[0]);
    assert!(
        attribution.contains(&format!("tests/attribution.rs:{} @ ", line)),
        "unexpected attribution: {}",
        attribution
    );
    assert!(!attribution.starts_with('/'));
    assert!(attribution.ends_with(" info"));
}

#[test]
fn test_attributes_macro_call_site() {
    let file = Arc::new(MemorySink::persistent());
    let logger = attributed_logger(file.clone());

    let line = line!() + 1;
    log_info!(logger, "value is {}", 7).unwrap();

    let attribution = attribution_line(&file.records()[0]);
    assert!(
        attribution.contains(&format!("tests/attribution.rs:{} @ ", line)),
        "unexpected attribution: {}",
        attribution
    );
}

#[test]
fn test_each_call_resolves_its_own_site() {
    let file = Arc::new(MemorySink::persistent());
    let logger = attributed_logger(file.clone());

    let first = line!() + 1;
    logger.warn("first").unwrap();
    let second = line!() + 1;
    logger.warn("second").unwrap();

    let records = file.records();
    assert!(attribution_line(&records[0]).contains(&format!("attribution.rs:{} ", first)));
    assert!(attribution_line(&records[1]).contains(&format!("attribution.rs:{} ", second)));
}

#[test]
fn test_relative_project_root_from_env() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("server.log");
    let success_path = dir.path().join("success.log");
    let settings = LoggerSettings::from_env_with(|key| match key {
        "LOG_PROJECT_ROOT" => Some(".".to_string()),
        "LOG_FILE_PATH" => Some(log_path.display().to_string()),
        "SUCCESS_LOG_FILE_PATH" => Some(success_path.display().to_string()),
        _ => None,
    })
    .unwrap();
    let loggers = Loggers::init(&settings).unwrap();

    let line = line!() + 1;
    loggers.log.info("relative root").unwrap();

    let content = fs::read_to_string(&log_path).unwrap();
    let (_, rest) = content.split_once("relative root\n").unwrap();
    let attribution = rest.lines().next().unwrap_or_default().trim();
    let cwd = std::env::current_dir().unwrap();

    assert!(
        attribution.contains(&format!("tests/attribution.rs:{} @ ", line)),
        "unexpected attribution: {}",
        attribution
    );
    assert!(!attribution.starts_with('/'));
    assert!(!attribution.contains(&*cwd.to_string_lossy()));
    assert!(!attribution.contains("//"));
}
