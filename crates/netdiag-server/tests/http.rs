// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the HTTP surface.
//!
//! Drives the router with `tower::ServiceExt::oneshot` so no socket is
//! bound. The launcher is a recording fake; the user directory is a real
//! in-memory SQLite database.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use netdiag_core::{
    AppConfig, DiagError, Diagnostics, ProcessLauncher, SqliteDirectory,
};
use netdiag_server::router;

#[derive(Default)]
struct RecordingLauncher {
    calls: Mutex<Vec<Vec<String>>>,
    lines: Vec<String>,
}

#[async_trait]
impl ProcessLauncher for RecordingLauncher {
    async fn run(
        &self,
        _program: &str,
        argv: &[String],
        _timeout: Duration,
    ) -> Result<Vec<String>, DiagError> {
        self.calls.lock().unwrap().push(argv.to_vec());
        Ok(self.lines.clone())
    }
}

fn test_app(launcher: Arc<RecordingLauncher>) -> Router {
    let directory = SqliteDirectory::open(":memory:").unwrap();
    directory.init_schema().unwrap();
    directory.insert_user("alice").unwrap();
    directory.insert_user("admin").unwrap();

    let diag = Diagnostics::new(Arc::new(directory), launcher, &AppConfig::default());
    router(Arc::new(diag))
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn health_answers_ok() {
    let app = test_app(Arc::new(RecordingLauncher::default()));
    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok\n");
}

#[tokio::test]
async fn lookup_renders_matching_row() {
    let app = test_app(Arc::new(RecordingLauncher::default()));
    let (status, body) = get(app, "/diag?user=alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "User: alice\n");
}

#[tokio::test]
async fn sql_injection_attempt_matches_no_rows() {
    let app = test_app(Arc::new(RecordingLauncher::default()));
    // user=admin' OR '1'='1
    let (status, body) = get(app, "/diag?user=admin%27%20OR%20%271%27%3D%271").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "");
}

#[tokio::test]
async fn chained_command_is_rejected_without_a_spawn() {
    let launcher = Arc::new(RecordingLauncher::default());
    let app = test_app(Arc::clone(&launcher));
    // host=127.0.0.1; rm -rf /
    let (status, body) = get(app, "/diag?host=127.0.0.1%3B%20rm%20-rf%20%2F").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("rejected"), "body was: {body}");
    assert!(launcher.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn valid_host_renders_probe_output_verbatim() {
    let launcher = Arc::new(RecordingLauncher {
        calls: Mutex::new(Vec::new()),
        lines: vec![
            "PING 127.0.0.1 56(84) bytes of data.".to_string(),
            "1 packets transmitted, 1 received".to_string(),
        ],
    });
    let app = test_app(Arc::clone(&launcher));

    let (status, body) = get(app, "/diag?host=127.0.0.1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        "PING 127.0.0.1 56(84) bytes of data.\n1 packets transmitted, 1 received\n"
    );

    let calls = launcher.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0],
        vec!["-c".to_string(), "1".to_string(), "127.0.0.1".to_string()]
    );
}

#[tokio::test]
async fn both_operations_render_in_order() {
    let launcher = Arc::new(RecordingLauncher {
        calls: Mutex::new(Vec::new()),
        lines: vec!["pong".to_string()],
    });
    let app = test_app(Arc::clone(&launcher));

    let (status, body) = get(app, "/diag?user=alice&host=example.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "User: alice\npong\n");
}

#[tokio::test]
async fn no_parameters_renders_empty_body() {
    let launcher = Arc::new(RecordingLauncher::default());
    let app = test_app(Arc::clone(&launcher));

    let (status, body) = get(app, "/diag").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "");
    assert!(launcher.calls.lock().unwrap().is_empty());
}
