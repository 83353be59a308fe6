use editor_session::{
    ClientConfig, EditorSurface, Error, ExecutionResult, FileStore, KeyValueStore,
    LanguageRegistry, MemoryStore, PistonClient, RunStatus, SessionStore, TextBuffer,
    EMPTY_CODE_MESSAGE, LANGUAGE_KEY,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Arc<PistonClient> {
    let config =
        ClientConfig::new().with_api_url(format!("{}/api/v2/piston/execute", server.uri()));
    Arc::new(PistonClient::new(config).unwrap())
}

fn session_for(server: &MockServer, storage: Arc<dyn KeyValueStore>) -> SessionStore {
    SessionStore::new(LanguageRegistry::builtin(), client_for(server), Some(storage))
}

async fn mount_response(server: &MockServer, body: serde_json::Value, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/v2/piston/execute"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_successful_run_trims_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/piston/execute"))
        .and(body_partial_json(json!({ "language": "python", "version": "3.10.0" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "run": { "code": 0, "output": "42\n" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server, Arc::new(MemoryStore::new()));
    assert_ok!(session.set_language("python"));
    session.attach_editor(Arc::new(TextBuffer::new("print(42)")));

    assert_ok!(session.run().await);

    assert_eq!(session.output(), "42");
    assert_eq!(session.error(), None);
    assert_eq!(session.status(), RunStatus::Idle);
    assert_eq!(
        session.last_execution().unwrap().result,
        ExecutionResult::Success {
            stdout: "42".to_string()
        }
    );
}

#[tokio::test]
async fn test_compile_failure_sets_error() {
    let server = MockServer::start().await;
    mount_response(
        &server,
        json!({ "compile": { "code": 1, "stderr": "syntax error" } }),
        1,
    )
    .await;

    let session = session_for(&server, Arc::new(MemoryStore::new()));
    assert_ok!(session.set_language("cpp"));
    session.attach_editor(Arc::new(TextBuffer::new("int main( {")));

    assert_ok!(session.run().await);

    assert_eq!(session.error().as_deref(), Some("syntax error"));
    assert_eq!(session.output(), "");
    assert_eq!(
        session.last_execution().unwrap().result,
        ExecutionResult::CompileFailure {
            message: "syntax error".to_string()
        }
    );
    assert_eq!(session.status(), RunStatus::Idle);
}

#[tokio::test]
async fn test_backend_message_overrides_stages() {
    let server = MockServer::start().await;
    mount_response(
        &server,
        json!({
            "message": "invalid language version",
            "compile": { "code": 1, "stderr": "ignored" },
            "run": { "code": 0, "output": "ignored" }
        }),
        1,
    )
    .await;

    let session = session_for(&server, Arc::new(MemoryStore::new()));
    session.attach_editor(Arc::new(TextBuffer::new("console.log(1)")));

    assert_ok!(session.run().await);

    assert_eq!(session.error().as_deref(), Some("invalid language version"));
    assert!(matches!(
        session.last_execution().unwrap().result,
        ExecutionResult::BackendError { .. }
    ));
}

#[tokio::test]
async fn test_http_failure_keeps_session_usable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_response(&server, json!({ "run": { "code": 0, "output": "second try\n" } }), 1).await;

    let session = session_for(&server, Arc::new(MemoryStore::new()));
    session.attach_editor(Arc::new(TextBuffer::new("console.log('second try')")));

    assert_ok!(session.run().await);
    let error = session.error().unwrap();
    assert!(error.contains("500"), "unexpected error: {}", error);
    assert_eq!(session.status(), RunStatus::Idle);

    assert_ok!(session.run().await);
    assert_eq!(session.error(), None);
    assert_eq!(session.output(), "second try");
}

#[tokio::test]
async fn test_empty_code_makes_no_request() {
    let server = MockServer::start().await;
    mount_response(&server, json!({ "run": { "code": 0, "output": "" } }), 0).await;

    let session = session_for(&server, Arc::new(MemoryStore::new()));
    session.attach_editor(Arc::new(TextBuffer::new("   \n")));
    let before = session.state();

    assert_ok!(session.run().await);

    let after = session.state();
    assert_eq!(after.error.as_deref(), Some(EMPTY_CODE_MESSAGE));
    assert_eq!(after.output, before.output);
    assert_eq!(after.status, RunStatus::Idle);
    assert_eq!(after.last_execution, before.last_execution);
}

#[tokio::test]
async fn test_unknown_persisted_language_is_reported() {
    let server = MockServer::start().await;
    mount_response(&server, json!({ "run": { "code": 0, "output": "" } }), 0).await;

    let storage = Arc::new(MemoryStore::new());
    assert_ok!(storage.set(LANGUAGE_KEY, "fortran77"));
    let session = session_for(&server, storage);
    session.attach_editor(Arc::new(TextBuffer::new("PRINT *, 'HI'")));

    assert_ok!(session.run().await);

    assert_eq!(
        session.error().as_deref(),
        Some("Unsupported language: fortran77")
    );
    assert_eq!(session.status(), RunStatus::Idle);
}

#[tokio::test]
async fn test_overlapping_run_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/piston/execute"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "run": { "code": 0, "output": "slow\n" } }))
                .set_delay(Duration::from_millis(500)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server, Arc::new(MemoryStore::new()));
    session.attach_editor(Arc::new(TextBuffer::new("console.log('slow')")));

    let (first, (was_running, second)) = tokio::join!(session.run(), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        (session.is_running(), session.run().await)
    });

    assert_ok!(first);
    assert!(was_running);
    assert!(matches!(assert_err!(second), Error::AlreadyRunning));
    assert_eq!(session.status(), RunStatus::Idle);
    assert_eq!(session.output(), "slow");
}

#[tokio::test]
async fn test_status_transitions_for_sequential_runs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/piston/execute"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "run": { "code": 0, "output": "tick\n" } }))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let session = session_for(&server, Arc::new(MemoryStore::new()));
    session.attach_editor(Arc::new(TextBuffer::new("console.log('tick')")));

    for _ in 0..2 {
        assert_eq!(session.status(), RunStatus::Idle);

        let (result, during) = tokio::join!(session.run(), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            session.status()
        });

        assert_ok!(result);
        assert_eq!(during, RunStatus::Running);
        assert_eq!(session.status(), RunStatus::Idle);
        assert_eq!(session.output(), "tick");
    }
}

#[tokio::test]
async fn test_per_language_code_survives_restart() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let storage_path = dir.path().join("storage.json");

    {
        let session = session_for(&server, Arc::new(FileStore::open(&storage_path)));
        session.set_theme("github-dark");
        session.set_font_size(20);
        session.attach_editor(Arc::new(TextBuffer::new("console.log('js')")));
        assert_ok!(session.set_language("python"));
    }

    let storage = Arc::new(FileStore::open(&storage_path));
    assert_eq!(
        storage.get("editor-code-javascript").as_deref(),
        Some("console.log('js')")
    );
    assert_eq!(storage.get("editor-code-python"), None);

    let session = session_for(&server, storage);
    let config = session.config();
    assert_eq!(config.language, "python");
    assert_eq!(config.theme, "github-dark");
    assert_eq!(config.font_size_px, 20);

    // Nothing saved for python yet: the editor keeps its content
    let editor = Arc::new(TextBuffer::new("print('py')"));
    session.attach_editor(editor.clone());
    assert_eq!(editor.value(), "print('py')");

    // Switching back does not touch the editor; re-attaching does
    assert_ok!(session.set_language("javascript"));
    assert_eq!(editor.value(), "print('py')");
    session.attach_editor(editor.clone());
    assert_eq!(editor.value(), "console.log('js')");
}
