// Sheet operations driven through the REST client against a mock API.

use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;
use sheetshape_core::{Mode, OperationsConfig, RetryPolicy, SheetError, SheetKey, SheetOperations};
use sheetshape_sheets_client::{AuthCredentials, ClientOptions, SheetsClient};

fn operations(server: &MockServer, attempts: u32) -> SheetOperations {
    let options = ClientOptions {
        api_base: server.base_url(),
        last_column: "Z".into(),
        timeout: Duration::from_secs(5),
    };
    let client = SheetsClient::new(AuthCredentials::new("tok"), options).unwrap();
    let config = OperationsConfig {
        retry: RetryPolicy::immediate(attempts),
        ..OperationsConfig::default()
    };
    SheetOperations::with_memory_store(Arc::new(client), config)
}

#[test]
fn list_sheets_from_url() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v4/spreadsheets/1AbC-d_E9");
        then.status(200).json_body(json!({
            "sheets": [{ "properties": { "sheetId": 0, "title": "Sheet1" } }]
        }));
    });

    let listing = operations(&server, 3)
        .list_sheets("https://docs.google.com/spreadsheets/d/1AbC-d_E9/edit#gid=0")
        .unwrap();

    assert_eq!(listing.source.as_str(), "1AbC-d_E9");
    assert_eq!(listing.titles, vec!["Sheet1"]);
}

#[test]
fn transient_status_retried_until_exhausted() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/v4/spreadsheets/abc/values/'Sheet1'!1:1");
        then.status(503).json_body(json!({ "error": { "message": "backend unavailable" } }));
    });

    let err = operations(&server, 3)
        .get_columns(&SheetKey::new("abc", "Sheet1"))
        .unwrap_err();

    mock.assert_calls(3);
    match err {
        SheetError::AllRetriesExhausted { attempts, last } => {
            assert_eq!(attempts, 3);
            assert_eq!(last.status, Some(503));
        }
        other => panic!("expected AllRetriesExhausted, got {other:?}"),
    }
}

#[test]
fn not_found_is_not_retried() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/v4/spreadsheets/abc/values/'Sheet1'!1:1");
        then.status(404).json_body(json!({ "error": { "message": "Requested entity was not found." } }));
    });

    let err = operations(&server, 5)
        .get_columns(&SheetKey::new("abc", "Sheet1"))
        .unwrap_err();

    mock.assert_calls(1);
    assert!(matches!(err, SheetError::NotFound(_)), "got {err:?}");
}

#[test]
fn missing_sheet_is_not_found_without_retries() {
    let server = MockServer::start();
    let header = server.mock(|when, then| {
        when.method(GET).path("/v4/spreadsheets/abc/values/'Nope'!1:1");
        then.status(400).json_body(json!({
            "error": { "code": 400, "message": "Unable to parse range: 'Nope'!1:1", "status": "INVALID_ARGUMENT" }
        }));
    });
    let data = server.mock(|when, then| {
        when.method(GET).path("/v4/spreadsheets/abc/values/'Nope'!A1:Z");
        then.status(400).json_body(json!({
            "error": { "code": 400, "message": "Unable to parse range: 'Nope'!A1:Z", "status": "INVALID_ARGUMENT" }
        }));
    });

    let ops = operations(&server, 5);
    let key = SheetKey::new("abc", "Nope");

    let err = ops.get_columns(&key).unwrap_err();
    assert_eq!(err.kind(), "not_found", "got {err:?}");
    header.assert_calls(1);

    let err = ops
        .save(&key, &["Name".to_string()], Mode::Prune)
        .unwrap_err();
    assert_eq!(err.kind(), "not_found", "got {err:?}");
    data.assert_calls(1);
    assert!(!ops.has_snapshot(&key));
}

#[test]
fn reorder_writes_remapped_grid() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v4/spreadsheets/abc/values/'Sheet1'!A1:Z");
        then.status(200).json_body(json!({
            "values": [["Name", "Age", "City"], ["Ann", "30", "Oslo"], ["Bob", "25"]]
        }));
    });
    let write = server.mock(|when, then| {
        when.method(PUT)
            .path("/v4/spreadsheets/abc/values/'Sheet1'!A1")
            .json_body(json!({
                "values": [["City", "Name", "Age"], ["Oslo", "Ann", "30"], ["", "Bob", "25"]]
            }));
        then.status(200).json_body(json!({}));
    });

    let desired = vec!["City".to_string(), "Name".to_string()];
    let outcome = operations(&server, 3)
        .save(&SheetKey::new("abc", "Sheet1"), &desired, Mode::Reorder)
        .unwrap();

    write.assert();
    assert_eq!(outcome.header, vec!["City", "Name", "Age"]);
    assert!(!outcome.revertible);
}

#[test]
fn prune_then_revert_restores_snapshot() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v4/spreadsheets/abc/values/'Sheet1'!A1:Z");
        then.status(200).json_body(json!({
            "values": [["Name", "Age", "City"], ["Ann", "30", "Oslo"]]
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/v4/spreadsheets/abc");
        then.status(200).json_body(json!({
            "sheets": [{ "properties": { "sheetId": 9, "title": "Sheet1" } }]
        }));
    });
    let delete = server.mock(|when, then| {
        when.method(POST)
            .path("/v4/spreadsheets/abc:batchUpdate")
            .json_body(json!({
                "requests": [{ "deleteDimension": { "range": {
                    "sheetId": 9, "dimension": "COLUMNS", "startIndex": 1, "endIndex": 2
                } } }]
            }));
        then.status(200).json_body(json!({ "replies": [{}] }));
    });
    let clear = server.mock(|when, then| {
        when.method(POST).path("/v4/spreadsheets/abc/values/'Sheet1'!A1:Z:clear");
        then.status(200).json_body(json!({}));
    });
    let restore = server.mock(|when, then| {
        when.method(PUT)
            .path("/v4/spreadsheets/abc/values/'Sheet1'!A1")
            .json_body(json!({ "values": [["Name", "Age", "City"], ["Ann", "30", "Oslo"]] }));
        then.status(200).json_body(json!({}));
    });

    let ops = operations(&server, 3);
    let key = SheetKey::new("abc", "Sheet1");
    let desired = vec!["City".to_string(), "Name".to_string()];

    let outcome = ops.save(&key, &desired, Mode::Prune).unwrap();
    delete.assert();
    assert_eq!(outcome.deleted, vec![1]);
    assert_eq!(outcome.header, vec!["Name", "City"]);
    assert!(ops.has_snapshot(&key));

    assert_eq!(ops.revert(&key).unwrap(), 2);
    clear.assert();
    restore.assert();
    assert!(!ops.has_snapshot(&key));

    let err = ops.revert(&key).unwrap_err();
    assert!(matches!(err, SheetError::NoSnapshot(_)), "got {err:?}");
    clear.assert_calls(1);
}
