//! Drives the page routes end to end with a scripted generator.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tokio::sync::Notify;
use tower::ServiceExt;

use icon_forge::api::{self, AppState};
use icon_forge::error::{AppError, AppResult};
use icon_forge::IconGenerator;

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

struct Scripted {
    reply: Result<String, String>,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(String, String, String)>>,
}

impl Scripted {
    fn ok(payload: &str) -> Self {
        Scripted { reply: Ok(payload.to_string()), gate: None, calls: AtomicUsize::new(0), seen: Mutex::new(Vec::new()) }
    }

    fn failing(message: &str) -> Self {
        Scripted { reply: Err(message.to_string()), ..Self::ok("") }
    }

    fn gated(payload: &str, gate: Arc<Notify>) -> Self {
        Scripted { gate: Some(gate), ..Self::ok(payload) }
    }
}

impl IconGenerator for Scripted {
    async fn generate(&self, base64_data: &str, mime_type: &str, prompt_text: &str) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((base64_data.to_string(), mime_type.to_string(), prompt_text.to_string()));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.reply.clone().map_err(AppError::Generation)
    }
}

fn app(generator: Scripted) -> (Router, Arc<AppState<Scripted>>) {
    let state = Arc::new(AppState::new(generator));
    (api::router(state.clone()), state)
}

fn upload_request(files: &[(&str, &str, &[u8])]) -> Request<Body> {
    upload_request_with_prompt(files, None)
}

fn upload_request_with_prompt(files: &[(&str, &str, &[u8])], prompt: Option<&str>) -> Request<Body> {
    let boundary = "----icon-forge-test-boundary";
    let mut body = Vec::new();
    for (name, mime, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{name}\"\r\nContent-Type: {mime}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    if let Some(prompt) = prompt {
        body.extend_from_slice(
            format!("--{boundary}\r\nContent-Disposition: form-data; name=\"prompt\"\r\n\r\n{prompt}\r\n").as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap()
}

fn form_request(uri: &str, prompt: &str) -> Request<Body> {
    let encoded: String = prompt.chars().map(|c| if c == ' ' { '+' } else { c }).collect();
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("prompt={encoded}")))
        .unwrap()
}

fn generate_request(prompt: &str) -> Request<Body> {
    form_request("/generate", prompt)
}

async fn page(app: &Router) -> String {
    let (_, _, body) = send(app, get("/")).await;
    String::from_utf8(body).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    (status, headers, body.to_vec())
}

async fn state_json(app: &Router) -> Value {
    let (_, _, body) = send(app, get("/state")).await;
    serde_json::from_slice(&body).unwrap()
}

async fn wait_until_settled<G: IconGenerator>(state: &AppState<G>) {
    for _ in 0..200 {
        if !state.orchestrator.read().await.is_in_flight() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("generation never finished");
}

#[tokio::test]
async fn upload_generate_and_download_scenario() {
    for (name, mime) in [("icon.png", "image/png"), ("photo.jpg", "image/jpeg"), ("logo.webp", "image/webp")] {
        let (app, state) = app(Scripted::ok("AAAA"));

        let (status, headers, _) = send(&app, upload_request(&[(name, mime, PNG_BYTES)])).await;
        assert_eq!(status, StatusCode::SEE_OTHER, "{mime}");
        assert_eq!(headers[header::LOCATION], "/");

        let snapshot = state_json(&app).await;
        assert_eq!(snapshot["state"], "image_selected");
        let preview_url = snapshot["preview"].as_str().unwrap().to_string();
        let (status, headers, body) = send(&app, get(&preview_url)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], mime);
        assert_eq!(body, PNG_BYTES);

        let (status, _, _) = send(&app, generate_request("run a security scan")).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        wait_until_settled(&state).await;

        let snapshot = state_json(&app).await;
        assert_eq!(snapshot["state"], "succeeded", "{mime}");
        assert_eq!(snapshot["result"], "data:image/png;base64,AAAA");
        assert!(snapshot["error"].is_null());
        assert_eq!(snapshot["prompt"], "run a security scan");

        {
            let seen = state.generator.seen.lock().unwrap();
            assert_eq!(seen.len(), 1);
            assert_eq!(seen[0].1, mime);
            assert_eq!(seen[0].2, "run a security scan");
            assert!(!seen[0].0.starts_with("data:"));
        }

        let page = page(&app).await;
        assert!(page.contains(r#"<img src="data:image/png;base64,AAAA""#));
        assert!(page.contains(r#"download="generated-icon.png""#));

        let (status, headers, body) = send(&app, get("/download")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "image/png");
        assert_eq!(headers[header::CONTENT_DISPOSITION], "attachment; filename=\"generated-icon.png\"");
        assert_eq!(body, vec![0, 0, 0]);
    }
}

#[tokio::test]
async fn upload_mime_type_is_normalised() {
    let (app, state) = app(Scripted::ok("AAAA"));

    let (status, _, _) = send(&app, upload_request(&[("icon.png", " IMAGE/PNG", PNG_BYTES)])).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    let (_, headers, _) = send(&app, get(state_json(&app).await["preview"].as_str().unwrap())).await;
    assert_eq!(headers[header::CONTENT_TYPE], "image/png");

    send(&app, generate_request("sync")).await;
    wait_until_settled(&state).await;
    assert_eq!(state.generator.seen.lock().unwrap()[0].1, "image/png");
}

#[tokio::test]
async fn unsupported_type_is_rejected_without_state_change() {
    let (app, _state) = app(Scripted::ok("AAAA"));

    let (status, _, body) = send(&app, upload_request(&[("anim.gif", "image/gif", &b"GIF89a"[..])])).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(String::from_utf8(body).unwrap().contains("Please upload a PNG, JPEG, or WEBP image."));

    let snapshot = state_json(&app).await;
    assert_eq!(snapshot["state"], "idle");
    assert!(snapshot["preview"].is_null());
}

#[tokio::test]
async fn only_the_first_file_of_a_drop_counts() {
    let (app, _state) = app(Scripted::ok("AAAA"));

    let files: [(&str, &str, &[u8]); 2] = [("a.webp", "image/webp", b"RIFF"), ("b.gif", "image/gif", b"GIF89a")];
    let (status, _, _) = send(&app, upload_request(&files)).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    let (_, headers, _) = send(&app, get(state_json(&app).await["preview"].as_str().unwrap())).await;
    assert_eq!(headers[header::CONTENT_TYPE], "image/webp");

    let files: [(&str, &str, &[u8]); 2] = [("b.gif", "image/gif", b"GIF89a"), ("a.png", "image/png", PNG_BYTES)];
    let (status, _, _) = send(&app, upload_request(&files)).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn generate_without_image_shows_validation_error() {
    let (app, state) = app(Scripted::ok("AAAA"));

    let (status, _, _) = send(&app, generate_request("anything")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);

    let snapshot = state_json(&app).await;
    assert_eq!(snapshot["state"], "failed");
    assert_eq!(snapshot["error"], "Please provide an image first.");
    assert_eq!(state.generator.calls.load(Ordering::SeqCst), 0);

    assert_eq!(page(&app).await.matches("Please provide an image first.").count(), 1);
}

#[tokio::test]
async fn service_failure_lands_in_error_panel() {
    let (app, state) = app(Scripted::failing("quota exceeded"));
    send(&app, upload_request(&[("icon.png", "image/png", PNG_BYTES)])).await;
    send(&app, generate_request("sync")).await;
    wait_until_settled(&state).await;

    let snapshot = state_json(&app).await;
    assert_eq!(snapshot["state"], "failed");
    assert_eq!(snapshot["error"], "quota exceeded");
    assert!(snapshot["result"].is_null());

    let (status, _, _) = send(&app, get("/download")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_failure_message_uses_fallback() {
    let (app, state) = app(Scripted::failing(""));
    send(&app, upload_request(&[("icon.png", "image/png", PNG_BYTES)])).await;
    send(&app, generate_request("sync")).await;
    wait_until_settled(&state).await;

    assert_eq!(state_json(&app).await["error"], icon_forge::error::UNKNOWN_ERROR_MESSAGE);
}

#[tokio::test]
async fn second_trigger_while_in_flight_is_ignored() {
    let gate = Arc::new(Notify::new());
    let (app, state) = app(Scripted::gated("AAAA", gate.clone()));
    send(&app, upload_request(&[("icon.png", "image/png", PNG_BYTES)])).await;

    send(&app, generate_request("first")).await;
    let snapshot = state_json(&app).await;
    assert_eq!(snapshot["state"], "generating");
    assert_eq!(snapshot["canGenerate"], false);

    send(&app, generate_request("second")).await;
    let (status, _, _) = send(&app, upload_request(&[("other.png", "image/png", PNG_BYTES)])).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _, _) = send(&app, post("/reset")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _, _) = send(&app, form_request("/reset", "third")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _, _) =
        send(&app, upload_request_with_prompt(&[("other.png", "image/png", PNG_BYTES)], Some("fourth"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(state_json(&app).await["prompt"], "first");

    gate.notify_one();
    wait_until_settled(&state).await;

    assert_eq!(state.generator.calls.load(Ordering::SeqCst), 1);
    assert_eq!(state.generator.seen.lock().unwrap()[0].2, "first");
    let snapshot = state_json(&app).await;
    assert_eq!(snapshot["state"], "succeeded");
    assert_eq!(snapshot["prompt"], "first");
}

#[tokio::test]
async fn reset_releases_preview_and_keeps_prompt() {
    let (app, state) = app(Scripted::ok("AAAA"));
    send(&app, upload_request(&[("icon.png", "image/png", PNG_BYTES)])).await;
    send(&app, generate_request("backup photos")).await;
    wait_until_settled(&state).await;
    let preview_url = state_json(&app).await["preview"].as_str().unwrap().to_string();

    let (status, _, _) = send(&app, post("/reset")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);

    let snapshot = state_json(&app).await;
    assert_eq!(snapshot["state"], "idle");
    assert_eq!(snapshot["prompt"], "backup photos");
    assert!(snapshot["result"].is_null());
    let (status, _, _) = send(&app, get(&preview_url)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(state.orchestrator.read().await.previews().live_count(), 0);
}

#[tokio::test]
async fn reset_keeps_the_prompt_typed_on_the_page() {
    let (app, _state) = app(Scripted::ok("AAAA"));
    send(&app, upload_request(&[("icon.png", "image/png", PNG_BYTES)])).await;

    let (status, _, _) = send(&app, form_request("/reset", "sync contacts")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);

    assert_eq!(state_json(&app).await["prompt"], "sync contacts");
    let page = page(&app).await;
    assert!(page.contains(r#"value="sync contacts""#));
    assert!(page.contains(r#"id="dropzone""#));
}

#[tokio::test]
async fn upload_keeps_the_prompt_typed_on_the_page() {
    let (app, _state) = app(Scripted::ok("AAAA"));

    let gif = [("anim.gif", "image/gif", &b"GIF89a"[..])];
    let (status, _, _) = send(&app, upload_request_with_prompt(&gif, Some("ignored"))).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(state_json(&app).await["prompt"], icon_forge::state::DEFAULT_PROMPT);

    let png = [("icon.png", "image/png", PNG_BYTES)];
    let (status, _, _) = send(&app, upload_request_with_prompt(&png, Some("backup photos"))).await;
    assert_eq!(status, StatusCode::SEE_OTHER);

    let page = page(&app).await;
    assert!(page.contains(r#"id="prompt" name="prompt" value="backup photos""#));
    assert!(page.contains(r#"id="reset-prompt" name="prompt" value="backup photos""#));
}
