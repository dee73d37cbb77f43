use super::*;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone, Default)]
struct Captured {
    csrf: Option<String>,
    content_type: Option<String>,
    referer: Option<String>,
    body: String,
}

#[derive(Clone, Default)]
struct ServerState {
    captured: Arc<Mutex<Vec<Captured>>>,
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn capture(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    state.captured.lock().await.push(Captured {
        csrf: header_text(&headers, "x-csrftoken"),
        content_type: header_text(&headers, "content-type"),
        referer: header_text(&headers, "referer"),
        body,
    });
    Json(json!({"status": "success", "image_url": "/media/scene.png"}))
}

async fn scene_page() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, "csrftoken=primed%3Dvalue; Path=/")],
        "<html>scene</html>",
    )
}

async fn story_input() -> Redirect {
    Redirect::to("/project/5/")
}

async fn project_page() -> &'static str {
    "<html>project</html>"
}

async fn forbidden() -> (StatusCode, &'static str) {
    (StatusCode::FORBIDDEN, "CSRF verification failed")
}

async fn spawn_server() -> std::io::Result<(String, ServerState)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState::default();
    let app = Router::new()
        .route("/project/1/scene/2/", get(scene_page))
        .route("/project/1/scene/2/edit-ajax/", post(capture))
        .route("/project/1/character/3/generate-image/", post(capture))
        .route("/project/5/story-input/", post(story_input))
        .route("/project/5/", get(project_page))
        .route("/project/6/story-input/", post(forbidden))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

fn edit_request() -> ActionRequest {
    ActionRequest {
        endpoint: "/project/1/scene/2/edit-ajax/".into(),
        body: RequestBody::Json(json!({"edit_prompt": "warmer light"})),
    }
}

#[test]
fn base_url_gains_trailing_slash_and_keeps_prefix() {
    let transport = HttpTransport::new("http://localhost:8000/storyboard", DEFAULT_CSRF_COOKIE)
        .expect("transport");
    assert_eq!(
        transport.base_url().as_str(),
        "http://localhost:8000/storyboard/"
    );
    assert_eq!(
        transport
            .resolve("/project/1/scene/2/generate-ajax/")
            .expect("resolve")
            .as_str(),
        "http://localhost:8000/storyboard/project/1/scene/2/generate-ajax/"
    );
}

#[test]
fn rejects_invalid_base_url() {
    assert!(HttpTransport::new("not a url", DEFAULT_CSRF_COOKIE).is_err());
}

#[tokio::test]
async fn sends_csrf_header_and_json_body() {
    let (server_url, state) = spawn_server().await.expect("spawn server");
    let transport = HttpTransport::new(&server_url, DEFAULT_CSRF_COOKIE).expect("transport");
    transport.set_csrf_token("tok%2F1");
    assert_eq!(transport.csrf_token().as_deref(), Some("tok/1"));

    let response = transport.send(&edit_request()).await.expect("send");
    assert!(response.is_success());
    assert_eq!(
        serde_json::from_str::<Value>(&response.body).expect("json"),
        json!({"status": "success", "image_url": "/media/scene.png"})
    );

    let captured = state.captured.lock().await.clone();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].csrf.as_deref(), Some("tok/1"));
    assert_eq!(captured[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(
        captured[0].referer.as_deref(),
        Some(format!("{server_url}/").as_str())
    );
    assert_eq!(
        serde_json::from_str::<Value>(&captured[0].body).expect("json body"),
        json!({"edit_prompt": "warmer light"})
    );
}

#[tokio::test]
async fn missing_cookie_omits_csrf_header() {
    let (server_url, state) = spawn_server().await.expect("spawn server");
    let transport = HttpTransport::new(&server_url, DEFAULT_CSRF_COOKIE).expect("transport");
    assert_eq!(transport.csrf_token(), None);

    transport.send(&edit_request()).await.expect("send");
    let captured = state.captured.lock().await.clone();
    assert_eq!(captured[0].csrf, None);
}

#[tokio::test]
async fn prime_collects_cookie_set_by_page() {
    let (server_url, state) = spawn_server().await.expect("spawn server");
    let transport = HttpTransport::new(&server_url, DEFAULT_CSRF_COOKIE).expect("transport");
    transport.prime("/project/1/scene/2/").await.expect("prime");
    assert_eq!(transport.csrf_token().as_deref(), Some("primed=value"));

    transport.send(&edit_request()).await.expect("send");
    let captured = state.captured.lock().await.clone();
    assert_eq!(captured[0].csrf.as_deref(), Some("primed=value"));
}

#[tokio::test]
async fn prime_page_is_loaded_lazily_before_first_post() {
    let (server_url, state) = spawn_server().await.expect("spawn server");
    let transport = HttpTransport::new(&server_url, DEFAULT_CSRF_COOKIE)
        .expect("transport")
        .with_prime_page("/project/1/scene/2/");
    assert_eq!(transport.csrf_token(), None);

    transport.send(&edit_request()).await.expect("send");
    assert_eq!(transport.csrf_token().as_deref(), Some("primed=value"));
    let captured = state.captured.lock().await.clone();
    assert_eq!(captured[0].csrf.as_deref(), Some("primed=value"));
}

#[tokio::test]
async fn seeded_token_skips_prime_page() {
    let (server_url, state) = spawn_server().await.expect("spawn server");
    let transport = HttpTransport::new(&server_url, DEFAULT_CSRF_COOKIE)
        .expect("transport")
        .with_prime_page("/does/not/exist/");
    transport.set_csrf_token("seeded");

    transport.send(&edit_request()).await.expect("send");
    let captured = state.captured.lock().await.clone();
    assert_eq!(captured[0].csrf.as_deref(), Some("seeded"));
}

#[tokio::test]
async fn form_body_is_url_encoded() {
    let (server_url, state) = spawn_server().await.expect("spawn server");
    let transport = HttpTransport::new(&server_url, DEFAULT_CSRF_COOKIE).expect("transport");
    transport
        .send(&ActionRequest {
            endpoint: "/project/1/character/3/generate-image/".into(),
            body: RequestBody::Form(vec![("prompt".into(), "a knight & a dragon".into())]),
        })
        .await
        .expect("send");

    let captured = state.captured.lock().await.clone();
    assert_eq!(
        captured[0].content_type.as_deref(),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(captured[0].body, "prompt=a+knight+%26+a+dragon");
}

#[tokio::test]
async fn form_submission_follows_redirect_to_final_page() {
    let (server_url, _state) = spawn_server().await.expect("spawn server");
    let transport = HttpTransport::new(&server_url, DEFAULT_CSRF_COOKIE).expect("transport");
    let response = transport
        .send(&ActionRequest {
            endpoint: "/project/5/story-input/".into(),
            body: RequestBody::Form(vec![("story_text".into(), "Once upon a time".into())]),
        })
        .await
        .expect("send");

    assert_eq!(response.status, 200);
    assert_eq!(response.location, format!("{server_url}/project/5/"));
    assert_eq!(response.body, "<html>project</html>");
}

#[tokio::test]
async fn error_statuses_are_responses_not_failures() {
    let (server_url, _state) = spawn_server().await.expect("spawn server");
    let transport = HttpTransport::new(&server_url, DEFAULT_CSRF_COOKIE).expect("transport");
    let response = transport
        .send(&ActionRequest {
            endpoint: "/project/6/story-input/".into(),
            body: RequestBody::Form(Vec::new()),
        })
        .await
        .expect("send");

    assert_eq!(response.status, 403);
    assert!(!response.is_success());
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let transport =
        HttpTransport::new(&format!("http://{addr}"), DEFAULT_CSRF_COOKIE).expect("transport");
    let err = transport.send(&edit_request()).await.expect_err("refused");
    assert!(matches!(err, ActionError::Transport(_)));
}
