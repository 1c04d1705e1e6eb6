//! Integration test: full dispatch pipeline.
//!
//! Validates: handler ordering across entry points → replacement threading →
//! page rendering under silencing → termination after the chain → shutdown
//! re-entry of a recorded fatal fault.

use crate::support::{RecordingHandler, RecordingHost, Rewrite, event_log};
use fault_common::fault::{Fault, FaultKind, Location};
use fault_common::handler::Handler;
use fault_common::host::ResponseStatus;
use fault_common::severity::Severity;
use fault_dispatch::handlers::{CaptureHandler, JsonLineClient};
use fault_dispatch::render::JsonPage;
use fault_dispatch::{DispatchError, DispatchState, Dispatcher, Visibility};
use std::sync::Arc;

#[test]
fn late_handler_intercepts_first() {
    let events = event_log();
    let host = RecordingHost::new(&events);
    let app = RecordingHandler::new("app", &events);
    let mock = RecordingHandler::new("mock", &events);

    let mut d = Dispatcher::with_handlers(host.clone(), [app.clone() as Arc<dyn Handler>]);
    d.push_handler(mock.clone());

    d.handle_recoverable(Severity::WARNING, "w", None).unwrap();
    d.handle_uncaught(Fault::native("boom", None));

    assert_eq!(*events.lock(), vec!["mock", "app", "mock", "app"]);
    assert_eq!(host.status(), ResponseStatus::InternalFailure);
}

#[test]
fn replacement_reaches_earlier_handlers() {
    let events = event_log();
    let host = RecordingHost::new(&events);
    let base = RecordingHandler::new("base", &events);

    let mut d = Dispatcher::new(host);
    d.push_handler(base.clone())
        .push_handler(Arc::new(Rewrite("scrubbed")));

    d.handle_recoverable(
        Severity::USER_NOTICE,
        "token=abc",
        Some(Location::new("auth.rs", 12)),
    )
    .unwrap();

    let seen = base.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].message(), "scrubbed");
    assert_eq!(seen[0].severity(), Severity::USER_NOTICE);
    assert_eq!(seen[0].location(), Some(&Location::new("auth.rs", 12)));
    assert_eq!(seen[0].kind(), FaultKind::Converted);
}

#[test]
fn recoverable_fault_arrives_as_converted() {
    let events = event_log();
    let host = RecordingHost::new(&events);
    let handler = RecordingHandler::new("h", &events);
    let mut d = Dispatcher::with_handlers(host, [handler.clone() as Arc<dyn Handler>]);

    d.handle_recoverable(Severity::DEPRECATED, "old api", Some(Location::new("lib.rs", 5)))
        .unwrap();

    let fault = &handler.seen()[0];
    assert!(fault.is_converted());
    assert_eq!(fault.severity(), Severity::DEPRECATED);
    assert_eq!(fault.message(), "old api");
}

#[test]
fn fatal_sequence_is_chain_then_terminate() {
    let events = event_log();
    let host = RecordingHost::new(&events);
    let h1 = RecordingHandler::new("h1", &events);
    let h2 = RecordingHandler::new("h2", &events);
    let h3 = RecordingHandler::new("h3", &events);
    let mut d = Dispatcher::with_handlers(
        host.clone(),
        [
            h1 as Arc<dyn Handler>,
            h2 as Arc<dyn Handler>,
            h3 as Arc<dyn Handler>,
        ],
    );

    assert!(d.handle_recoverable(Severity::CORE_ERROR, "core", None).unwrap());

    assert_eq!(*events.lock(), vec!["h3", "h2", "h1", "terminate"]);
    assert_eq!(host.count("terminate"), 1);
    assert_eq!(d.state(), DispatchState::Terminated);
}

#[test]
fn silenced_native_fault_gets_json_page() {
    let events = event_log();
    let host = RecordingHost::with_display(&events, false);
    let mut d = Dispatcher::new(host.clone());
    assert!(d.is_silenced());
    d.set_error_page(Some(Arc::new(JsonPage)));

    let visibility = d.handle_uncaught(Fault::native("db down", Some(Location::new("db.rs", 3))));

    assert_eq!(visibility, Visibility::Suppressed);
    let log = events.lock();
    assert_eq!(log.len(), 1);
    let body = log[0].strip_prefix("page:").unwrap();
    let value: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(value["error"]["message"], "db down");
}

#[test]
fn silenced_recoverable_fault_shows_no_page() {
    let events = event_log();
    let host = RecordingHost::with_display(&events, false);
    let mut d = Dispatcher::new(host.clone());
    d.set_error_page(Some(Arc::new(JsonPage)));

    let handled = d
        .handle_recoverable(Severity::WARNING, "warning", Some(Location::new("index.rs", 11)))
        .unwrap();

    assert!(handled);

    assert!(events.lock().iter().all(|e| !e.starts_with("page:")));
}

#[test]
fn throw_mode_hands_fault_to_caller() {
    let events = event_log();
    let host = RecordingHost::new(&events);
    let handler = RecordingHandler::new("h", &events);
    let mut d = Dispatcher::with_handlers(host.clone(), [handler.clone() as Arc<dyn Handler>]);
    d.treat_errors_as_exceptions(true);

    let err = d
        .handle_recoverable(Severity::ERROR, "fatal but raised", None)
        .unwrap_err();

    assert!(matches!(&err, DispatchError::Raised(f) if f.severity() == Severity::ERROR));
    assert_eq!(handler.calls(), 0);
    assert_eq!(host.count("terminate"), 0);

    // The caller re-reports the raised fault as uncaught.
    d.handle_uncaught(err.into_fault());
    assert_eq!(handler.calls(), 1);
}

#[test]
fn shutdown_with_recorded_fatal_fault() {
    let events = event_log();
    let host = RecordingHost::new(&events);
    host.set_last_fault(Some(Fault::converted(
        Severity::ERROR,
        "error in file",
        Some(Location::new("test.rs", 8)),
    )));
    let handler = RecordingHandler::new("h", &events);
    let mut d = Dispatcher::with_handlers(host.clone(), [handler.clone() as Arc<dyn Handler>]);
    d.treat_errors_as_exceptions(true);

    d.handle_shutdown().unwrap();

    assert!(!d.throws_as_exceptions());
    assert_eq!(*events.lock(), vec!["h", "terminate"]);
    let seen = handler.seen();
    assert_eq!(seen[0].message(), "error in file");
    assert_eq!(seen[0].location(), Some(&Location::new("test.rs", 8)));
}

#[test]
fn shutdown_with_unreportable_fatal_fault_terminates_silently() {
    let events = event_log();
    let host = RecordingHost::new(&events);
    host.set_reporting(Severity::empty());
    host.set_last_fault(Some(Fault::converted(Severity::PARSE, "parse", None)));
    let handler = RecordingHandler::new("h", &events);
    let mut d = Dispatcher::with_handlers(host.clone(), [handler.clone() as Arc<dyn Handler>]);

    d.handle_shutdown().unwrap();

    assert_eq!(handler.calls(), 0);
    assert_eq!(*events.lock(), vec!["terminate"]);
}

#[test]
fn shared_handler_across_dispatchers() {
    let events = event_log();
    let shared = RecordingHandler::new("shared", &events);

    let mut a = Dispatcher::new(RecordingHost::new(&events));
    let mut b = Dispatcher::new(RecordingHost::new(&events));
    a.push_handler(shared.clone());
    b.push_handler(shared.clone());

    a.handle_uncaught(Fault::native("a", None));
    b.handle_uncaught(Fault::native("b", None));

    let messages: Vec<String> = shared.seen().iter().map(|f| f.message().to_string()).collect();
    assert_eq!(messages, vec!["a", "b"]);
}

#[test]
fn capture_handler_in_chain() {
    let events = event_log();
    let host = RecordingHost::new(&events);
    let client = Arc::new(JsonLineClient::new("svc", Vec::new()));
    let capture = CaptureHandler::with_minimum(Arc::clone(&client), Severity::FATAL_DEFAULT);

    let mut d = Dispatcher::new(host);
    d.push_handler(Arc::new(capture));

    d.handle_recoverable(Severity::NOTICE, "ignored", None).unwrap();
    d.handle_uncaught(Fault::native("captured", None));

    drop(d);
    let client = Arc::try_unwrap(client).ok().expect("sole owner");
    let out = String::from_utf8(client.into_inner()).unwrap();
    assert_eq!(out.lines().count(), 1);
    assert!(out.contains("\"captured\""));
}
