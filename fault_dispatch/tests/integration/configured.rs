//! Integration test: configuration drives dispatcher policy.

use crate::support::{RecordingHandler, RecordingHost, event_log};
use fault_common::config::{ConfigError, ConfigLoader, FaultConfig};
use fault_common::fault::Fault;
use fault_common::host::Host;
use fault_common::severity::Severity;
use fault_dispatch::{Dispatcher, ProcessHost, Visibility};
use std::io::Write;
use tempfile::NamedTempFile;

const PRODUCTION: &str = r#"
[shared]
log_level = "warn"
service_name = "orders-api"

[host]
reporting = "ERROR | WARNING | USER_ERROR | USER_WARNING"
display_errors = false
exit_code = 70

[dispatch]
error_page = "json"
"#;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn production_config_from_file() {
    let file = write_config(PRODUCTION);
    let config = FaultConfig::load(file.path()).unwrap();
    config.validate().unwrap();

    let events = event_log();
    let host = RecordingHost::with_display(&events, config.host.display_errors);
    host.set_reporting(config.host.reporting);
    let handler = RecordingHandler::new("h", &events);

    let mut d = Dispatcher::from_config(host.clone(), &config.dispatch);
    d.push_handler(handler.clone());

    assert!(d.is_silenced());
    assert!(!d.throws_as_exceptions());
    assert_eq!(d.fatal_mask(), Severity::FATAL_DEFAULT);

    // NOTICE is outside the configured reporting mask.
    d.handle_recoverable(Severity::NOTICE, "ignored", None).unwrap();
    assert_eq!(handler.calls(), 0);

    let visibility = d.handle_uncaught(Fault::native("db down", None));
    assert_eq!(visibility, Visibility::Suppressed);

    let log = events.lock();
    assert_eq!(log[0], "h");
    assert!(log[1].starts_with("page:{\"status\":500"));
}

#[test]
fn explicit_silence_overrides_display_setting() {
    let config = FaultConfig::from_toml(
        r#"
[shared]
service_name = "svc"

[host]
display_errors = false

[dispatch]
silence_all = false
error_page = "plain"
"#,
    )
    .unwrap();

    let events = event_log();
    let host = RecordingHost::with_display(&events, config.host.display_errors);
    let mut d = Dispatcher::from_config(host, &config.dispatch);

    assert!(!d.is_silenced());
    assert_eq!(d.handle_uncaught(Fault::native("boom", None)), Visibility::Default);
    assert!(events.lock().is_empty());
}

#[test]
fn throw_mode_and_fatal_mask_from_config() {
    let config = FaultConfig::from_toml(
        r#"
[shared]
service_name = "svc"

[dispatch]
throw_as_exception = true
fatal_mask = "USER_ERROR"
"#,
    )
    .unwrap();

    let events = event_log();
    let mut d = Dispatcher::from_config(RecordingHost::new(&events), &config.dispatch);

    assert!(d.throws_as_exceptions());
    assert_eq!(d.fatal_mask(), Severity::USER_ERROR);
    assert!(d.handle_recoverable(Severity::WARNING, "raised", None).is_err());
}

#[test]
fn process_host_follows_host_section() {
    let file = write_config(PRODUCTION);
    let config = FaultConfig::load(file.path()).unwrap();
    let host = ProcessHost::new(&config.host);

    assert_eq!(host.reportable_mask(), config.host.reporting);
    assert!(!host.display_errors());
    assert_eq!(host.exit_code(), 70);
    assert!(Dispatcher::new(std::sync::Arc::new(host)).is_silenced());
}

#[test]
fn missing_file_reported() {
    let dir = tempfile::tempdir().unwrap();
    let result = FaultConfig::load(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::FileNotFound)));
}
