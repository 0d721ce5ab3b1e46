//! Tests for the public validation surface.

use std::sync::{Arc, Mutex};

use futures::future::join_all;
use validity::prelude::*;

fn surface() -> ValidationSurface {
    ValidationSurface::new(
        Arc::new(TokioExecutor::current().unwrap()),
        Arc::new(InlineDispatcher),
    )
}

fn fixed(errors: &[&str]) -> Validator {
    let errors: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    Validator::new(move || {
        let errors = errors.clone();
        async move { errors }
    })
}

#[tokio::test]
async fn test_single_error_is_reported() {
    let surface = surface();
    surface.register_validator("Name", fixed(&["too short"]));

    surface.validate("Name").unwrap().await;

    assert!(surface.has_errors());
    assert!(!surface.is_valid());
    assert!(!surface.is_validating());
    assert_eq!(surface.errors(), vec!["too short"]);
    assert_eq!(surface.errors_for("Name"), vec!["too short"]);
}

#[tokio::test]
async fn test_no_errors_when_validators_pass() {
    let surface = surface();
    surface.register_validator("A", fixed(&[]));
    surface.register_validator("B", fixed(&[]));

    join_all(surface.validate_all()).await;

    assert!(!surface.has_errors());
    assert!(surface.is_valid());
    assert!(!surface.is_validating());
    assert!(surface.errors().is_empty());
}

#[tokio::test]
async fn test_empty_result_clears_previous_errors() {
    let surface = surface();
    let response = Arc::new(Mutex::new(vec!["too short".to_string()]));

    let current = Arc::clone(&response);
    surface.register_validator(
        "Name",
        Validator::blocking(move || current.lock().unwrap().clone()),
    );

    surface.validate("Name").unwrap().await;
    assert!(surface.has_errors());

    response.lock().unwrap().clear();
    surface.validate("Name").unwrap().await;

    assert!(!surface.has_errors());
    assert!(surface.is_valid());
    assert!(surface.errors_for("Name").is_empty());
}

#[tokio::test]
async fn test_no_value_counts_as_valid() {
    let surface = surface();
    surface.register_validator("Name", fixed(&["too short"]));
    surface.validate("Name").unwrap().await;

    surface.register_validator("Name", Validator::new(|| async { None::<Vec<String>> }));
    surface.validate("Name").unwrap().await;

    assert!(surface.errors().is_empty());
    assert!(surface.is_valid());
}

#[tokio::test]
async fn test_failing_validator_message_becomes_error() {
    let surface = surface();
    surface.register_validator("Name", fixed(&["stale"]));
    surface.validate("Name").unwrap().await;

    surface.register_validator(
        "Name",
        Validator::new(|| async { Err::<Vec<String>, _>("boom") }),
    );
    surface.validate("Name").unwrap().await;

    assert_eq!(surface.errors_for("Name"), vec!["boom"]);
    assert_eq!(surface.errors(), vec!["boom"]);
    assert!(!surface.is_valid());
}

#[tokio::test]
async fn test_failing_blocking_validator() {
    let surface = surface();
    surface.register_validator(
        "Path",
        Validator::blocking(|| {
            std::fs::read_to_string("/definitely/not/here").map(|_| Vec::<String>::new())
        }),
    );

    surface.validate("Path").unwrap().await;

    assert_eq!(surface.errors_for("Path").len(), 1);
}

#[tokio::test]
async fn test_panicking_validator_reports_panic_message() {
    let surface = surface();
    surface.register_validator(
        "Async",
        Validator::new(|| async {
            if true {
                panic!("async kaboom");
            }
            Vec::<String>::new()
        }),
    );
    surface.register_validator(
        "Blocking",
        Validator::blocking(|| -> Vec<String> { panic!("blocking kaboom") }),
    );

    join_all(surface.validate_all()).await;

    assert_eq!(surface.errors_for("Async"), vec!["async kaboom"]);
    assert_eq!(surface.errors_for("Blocking"), vec!["blocking kaboom"]);
    assert!(!surface.is_validating());
}

#[tokio::test]
async fn test_validate_all_collects_every_field() {
    let surface = surface();
    surface.register_validator("A", fixed(&["a is wrong"]));
    surface.register_validator("B", fixed(&["b is wrong"]));

    let handles = surface.validate_all();
    assert_eq!(handles.len(), 2);
    join_all(handles).await;

    let errors = surface.errors();
    assert_eq!(errors.len(), 2);
    assert!(errors.contains(&"a is wrong".to_string()));
    assert!(errors.contains(&"b is wrong".to_string()));
}

#[tokio::test]
async fn test_validate_all_with_multiple_errors_per_field() {
    let surface = surface();
    surface.register_validator("A", fixed(&["a1"]));
    surface.register_validator("B", fixed(&["b1", "b2"]));

    join_all(surface.validate_all()).await;

    assert_eq!(surface.errors().len(), 3);
    assert_eq!(surface.errors_for("A"), vec!["a1"]);
    assert_eq!(surface.errors_for("B"), vec!["b1", "b2"]);
}

#[tokio::test]
async fn test_unregistered_field_is_noop() {
    let surface = surface();

    let handle = surface.validate("Missing").unwrap();
    assert!(handle.is_noop());
    handle.await;

    assert!(surface.errors_for("Missing").is_empty());
    assert!(surface.is_valid());
}

#[tokio::test]
async fn test_errors_for_bad_names_is_empty() {
    let surface = surface();
    surface.register_validator("A", fixed(&["a1"]));
    join_all(surface.validate_all()).await;

    for name in ["", " ", "doesNotExist"] {
        assert!(surface.errors_for(name).is_empty(), "name {:?}", name);
    }
}

#[tokio::test]
async fn test_validate_rejects_blank_names() {
    let surface = surface();
    surface.register_validator("A", fixed(&["a1"]));

    for name in ["", " ", "\t\n"] {
        assert_eq!(
            surface.validate(name).unwrap_err(),
            ValidationError::EmptyFieldName
        );
    }
    assert!(!surface.is_validating());
}

#[tokio::test]
async fn test_unregister_keeps_errors_until_next_run() {
    let surface = surface();
    surface.register_validator("Name", fixed(&["too short"]));
    surface.validate("Name").unwrap().await;

    assert!(surface.unregister_validator("Name"));
    assert_eq!(surface.errors_for("Name"), vec!["too short"]);

    // Without a validator the next trigger is a no-op, so errors stay.
    assert!(surface.validate("Name").unwrap().is_noop());
    assert_eq!(surface.errors_for("Name"), vec!["too short"]);

    surface.register_validator("Name", fixed(&[]));
    surface.validate("Name").unwrap().await;
    assert!(surface.errors_for("Name").is_empty());
}

#[tokio::test]
async fn test_distinct_errors_config() {
    let surface = ValidationSurface::with_config(
        Arc::new(TokioExecutor::current().unwrap()),
        Arc::new(InlineDispatcher),
        ValidationConfig::default().with_distinct_errors(true),
    );
    surface.register_validator("Password", fixed(&["required"]));
    surface.register_validator("Confirm", fixed(&["required"]));

    join_all(surface.validate_all()).await;

    assert_eq!(surface.errors(), vec!["required"]);
    assert_eq!(surface.errors_for("Confirm"), vec!["required"]);
}
