//! Call dispatch integration tests.
//!
//! Resolve, bind, execute and normalize against a real SQLite database.

use super::users_dispatcher;
use pretty_assertions::assert_eq;
use sqlapi::error::ApiError;
use sqlapi::query::{ParameterSet, ResultRow};

fn row(pairs: &[(&str, &str)]) -> ResultRow {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn params(query: &str) -> ParameterSet {
    ParameterSet::from_query_string(query)
}

#[tokio::test]
async fn test_lookup_by_id() {
    let (_dir, dispatcher) = users_dispatcher().await;

    let rows = dispatcher.dispatch("users", &params("id=1")).await.unwrap();

    assert_eq!(rows, vec![row(&[("name", "ada")])]);
}

#[tokio::test]
async fn test_no_matching_rows_is_empty() {
    let (_dir, dispatcher) = users_dispatcher().await;

    let rows = dispatcher.dispatch("users", &params("id=999")).await.unwrap();

    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_missing_template_is_not_found() {
    let (_dir, dispatcher) = users_dispatcher().await;

    let err = dispatcher
        .dispatch("missing", &params("id=1"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_traversal_is_not_found() {
    let (_dir, dispatcher) = users_dispatcher().await;

    for call in ["../users", "..", "users.sql", "sub/users"] {
        let err = dispatcher.dispatch(call, &params("id=1")).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)), "{call}: {err}");
    }
}

#[tokio::test]
async fn test_missing_parameter_is_binding_error() {
    let (_dir, dispatcher) = users_dispatcher().await;

    let err = dispatcher.dispatch("users", &params("")).await.unwrap_err();

    assert!(matches!(err, ApiError::Binding(_)));
    assert!(err.to_string().contains(":id"));
}

#[tokio::test]
async fn test_extra_parameters_are_ignored() {
    let (_dir, dispatcher) = users_dispatcher().await;

    let rows = dispatcher
        .dispatch("users", &params("id=1&name=mallory&verbose=true"))
        .await
        .unwrap();

    assert_eq!(rows, vec![row(&[("name", "ada")])]);

    let rows = dispatcher
        .dispatch("all_users", &params("limit=1"))
        .await
        .unwrap();
    assert_eq!(rows.len(), 3);
}

#[tokio::test]
async fn test_first_repeated_parameter_wins() {
    let (_dir, dispatcher) = users_dispatcher().await;

    let rows = dispatcher
        .dispatch("users", &params("id=2&id=1"))
        .await
        .unwrap();

    assert_eq!(rows, vec![row(&[("name", "bob")])]);
}

#[tokio::test]
async fn test_repeated_placeholder_binds_same_value() {
    let (_dir, dispatcher) = users_dispatcher().await;

    let by_name = dispatcher.dispatch("search", &params("q=carol")).await.unwrap();
    let by_email = dispatcher
        .dispatch("search", &params("q=carol%40example.com"))
        .await
        .unwrap();

    assert_eq!(by_name, vec![row(&[("name", "carol")])]);
    assert_eq!(by_email, by_name);
}

#[tokio::test]
async fn test_rows_keep_database_order() {
    let (_dir, dispatcher) = users_dispatcher().await;

    let rows = dispatcher.dispatch("all_users", &params("")).await.unwrap();

    let names: Vec<&str> = rows.iter().map(|r| r["name"].as_str()).collect();
    assert_eq!(names, vec!["ada", "bob", "carol"]);
}

#[tokio::test]
async fn test_blob_column_is_decoded() {
    let (_dir, dispatcher) = users_dispatcher().await;

    let rows = dispatcher.dispatch("avatar", &params("id=1")).await.unwrap();

    assert_eq!(rows, vec![row(&[("avatar", "ada.png")])]);
}

#[tokio::test]
async fn test_numeric_column_fails_whole_call() {
    let (_dir, dispatcher) = users_dispatcher().await;

    let err = dispatcher
        .dispatch("user_ages", &params(""))
        .await
        .unwrap_err();

    match err {
        ApiError::UnsupportedType { column, .. } => assert_eq!(column, "age"),
        other => panic!("Expected UnsupportedType, got {other:?}"),
    }
}

#[tokio::test]
async fn test_null_in_later_row_fails_whole_call() {
    let (_dir, dispatcher) = users_dispatcher().await;

    // ada's row converts fine; bob's NULL email must still fail the call.
    let err = dispatcher.dispatch("emails", &params("")).await.unwrap_err();
    assert!(matches!(err, ApiError::UnsupportedType { .. }));

    let err = dispatcher
        .dispatch("avatar", &params("id=2"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::UnsupportedType { .. }));
}

#[tokio::test]
async fn test_sql_errors_are_execution_errors() {
    let (_dir, dispatcher) = users_dispatcher().await;

    for call in ["broken", "no_table"] {
        let err = dispatcher.dispatch(call, &params("")).await.unwrap_err();
        assert!(matches!(err, ApiError::Execution(_)), "{call}: {err}");
    }
}

#[tokio::test]
async fn test_failure_does_not_poison_later_calls() {
    let (_dir, dispatcher) = users_dispatcher().await;

    assert!(dispatcher.dispatch("broken", &params("")).await.is_err());
    assert!(dispatcher.dispatch("user_ages", &params("")).await.is_err());

    let rows = dispatcher.dispatch("users", &params("id=3")).await.unwrap();
    assert_eq!(rows, vec![row(&[("name", "carol")])]);
}

#[tokio::test]
async fn test_templates_are_reread_per_call() {
    let (dir, dispatcher) = users_dispatcher().await;

    let before = dispatcher.dispatch("users", &params("id=1")).await.unwrap();
    assert_eq!(before, vec![row(&[("name", "ada")])]);

    std::fs::write(
        dir.path().join("users.sql"),
        "SELECT email AS name FROM users WHERE id = :id",
    )
    .unwrap();

    let after = dispatcher.dispatch("users", &params("id=1")).await.unwrap();
    assert_eq!(after, vec![row(&[("name", "ada@example.com")])]);
}
