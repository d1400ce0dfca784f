use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::post,
    Json, Router,
};
use mcq_backend::{config::Config, routes, AppState};
use serde_json::{json, Value as JsonValue};
use tokio::net::TcpListener;
use tower::ServiceExt;

const QUESTIONS_JSON: &str = r#"{"questions":[{"id":1,"question":"Which keyword declares a constant in Java?","options":{"A":"const","B":"final","C":"static","D":"let"},"correct_answer":"B","explanation":"final prevents reassignment."}]}"#;

#[derive(Clone)]
struct Upstream {
    status: StatusCode,
    reply: String,
    hits: Arc<AtomicUsize>,
    last_body: Arc<Mutex<Option<JsonValue>>>,
}

impl Upstream {
    fn new(status: StatusCode, reply: &str) -> Self {
        Self {
            status,
            reply: reply.to_string(),
            hits: Arc::new(AtomicUsize::new(0)),
            last_body: Arc::new(Mutex::new(None)),
        }
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    fn last_body(&self) -> JsonValue {
        self.last_body.lock().unwrap().clone().expect("upstream was called")
    }

    fn record(&self, body: JsonValue) {
        self.hits.fetch_add(1, Ordering::SeqCst);
        *self.last_body.lock().unwrap() = Some(body);
    }
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn fake_gemini(upstream: Upstream) -> String {
    let handler = move |Json(body): Json<JsonValue>| {
        let upstream = upstream.clone();
        async move {
            upstream.record(body);
            let reply = if upstream.status.is_success() {
                json!({"candidates": [{"content": {"role": "model", "parts": [{"text": upstream.reply}]}}]})
            } else {
                json!({"error": {"code": upstream.status.as_u16(), "message": upstream.reply}})
            };
            (upstream.status, Json(reply))
        }
    };
    serve(Router::new().route("/v1beta/models/:model", post(handler))).await
}

async fn fake_openai(upstream: Upstream) -> String {
    let handler = move |Json(body): Json<JsonValue>| {
        let upstream = upstream.clone();
        async move {
            upstream.record(body);
            let reply = if upstream.status.is_success() {
                json!({"choices": [{"index": 0, "message": {"role": "assistant", "content": upstream.reply}}]})
            } else {
                json!({"error": {"message": upstream.reply}})
            };
            (upstream.status, Json(reply))
        }
    };
    serve(Router::new().route("/chat/completions", post(handler))).await
}

fn test_config(gemini_url: &str, openai_url: &str) -> Config {
    Config {
        server_address: "127.0.0.1:0".to_string(),
        gemini_api_key: Some("server-gemini-key".to_string()),
        gemini_model: "gemini-2.5-flash".to_string(),
        gemini_base_url: gemini_url.to_string(),
        openai_base_url: openai_url.to_string(),
        default_fallback_model: "gpt-3.5-turbo".to_string(),
        llm_timeout_secs: 5,
        retry_attempts: 3,
        retry_initial_delay_secs: 0.0,
        retry_exp_base: 7.0,
        retry_max_delay_secs: 0.0,
        retry_jitter_secs: 0.0,
        vercel_url: None,
        extra_cors_origins: vec![],
        log_json: false,
    }
}

async fn setup_app(gemini: &Upstream, openai: &Upstream) -> Router {
    let gemini_url = fake_gemini(gemini.clone()).await;
    let openai_url = fake_openai(openai.clone()).await;
    let state = tokio_test::assert_ok!(AppState::new(&test_config(&gemini_url, &openai_url)));
    routes::api_router().with_state(state)
}

async fn post_generate(app: Router, body: JsonValue) -> (StatusCode, JsonValue) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/generate-questions")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
    (status, json)
}

#[tokio::test]
async fn health_reports_ok() {
    let app = setup_app(
        &Upstream::new(StatusCode::OK, QUESTIONS_JSON),
        &Upstream::new(StatusCode::OK, QUESTIONS_JSON),
    )
    .await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn fenced_gemini_reply_is_parsed_and_normalized() {
    let fenced = format!("Here are your questions:\n```json\n{}\n```\nGood luck!", QUESTIONS_JSON);
    let gemini = Upstream::new(StatusCode::OK, &fenced);
    let openai = Upstream::new(StatusCode::OK, "{}");
    let app = setup_app(&gemini, &openai).await;

    let (status, body) = post_generate(
        app,
        json!({"subject": "  Java ", "difficulty": "medium", "num_questions": 3}),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["subject"], "java");
    assert_eq!(body["difficulty"], "medium");
    assert_eq!(body["num_questions"], 3);
    // The model returned one question for a request of three; it is passed through as-is.
    assert_eq!(body["questions"].as_array().unwrap().len(), 1);
    assert_eq!(body["questions"][0]["correct_answer"], "B");
    assert_eq!(gemini.hits(), 1);
    assert_eq!(openai.hits(), 0);

    let sent = gemini.last_body();
    let system = sent["systemInstruction"]["parts"][0]["text"].as_str().unwrap();
    assert!(system.contains("expert in Java programming"));
    let prompt = sent["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.starts_with("Generate 3 medium difficulty MCQ questions on Java."));
}

#[tokio::test]
async fn dbms_and_sql_share_a_catalog_entry() {
    let gemini = Upstream::new(StatusCode::OK, QUESTIONS_JSON);
    let openai = Upstream::new(StatusCode::OK, "{}");
    let app = setup_app(&gemini, &openai).await;

    let (status, body) = post_generate(
        app.clone(),
        json!({"subject": "dbms", "difficulty": "easy", "num_questions": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subject"], "dbms");
    let dbms_instruction = gemini.last_body()["systemInstruction"].clone();

    let (status, body) = post_generate(
        app,
        json!({"subject": "SQL", "difficulty": "easy", "num_questions": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subject"], "sql");
    assert_eq!(gemini.last_body()["systemInstruction"], dbms_instruction);
}

#[tokio::test]
async fn unknown_subject_is_rejected_without_remote_call() {
    let gemini = Upstream::new(StatusCode::OK, QUESTIONS_JSON);
    let openai = Upstream::new(StatusCode::OK, "{}");
    let app = setup_app(&gemini, &openai).await;

    let (status, body) = post_generate(
        app,
        json!({"subject": "unknown", "difficulty": "easy", "num_questions": 5}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("unknown"));
    assert_eq!(gemini.hits(), 0);
}

#[tokio::test]
async fn question_count_bounds_are_enforced_before_generation() {
    let gemini = Upstream::new(StatusCode::OK, QUESTIONS_JSON);
    let openai = Upstream::new(StatusCode::OK, "{}");
    let app = setup_app(&gemini, &openai).await;

    for n in [0, 41] {
        let (status, body) = post_generate(
            app.clone(),
            json!({"subject": "python", "difficulty": "hard", "num_questions": n}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "num_questions = {n}");
        assert!(body["detail"].as_str().unwrap().contains("between 1 and 40"));
    }
    assert_eq!(gemini.hits(), 0);

    for n in [1, 40] {
        let (status, _) = post_generate(
            app.clone(),
            json!({"subject": "python", "difficulty": "hard", "num_questions": n}),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "num_questions = {n}");
    }
    assert_eq!(gemini.hits(), 2);
}

#[tokio::test]
async fn invalid_difficulty_is_a_bad_request() {
    let gemini = Upstream::new(StatusCode::OK, QUESTIONS_JSON);
    let openai = Upstream::new(StatusCode::OK, "{}");
    let app = setup_app(&gemini, &openai).await;

    let (status, body) = post_generate(
        app,
        json!({"subject": "linux", "difficulty": "impossible", "num_questions": 5}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
    assert_eq!(gemini.hits(), 0);
}

#[tokio::test]
async fn transient_gemini_errors_are_retried_then_fall_back() {
    let gemini = Upstream::new(StatusCode::SERVICE_UNAVAILABLE, "model overloaded");
    let openai = Upstream::new(StatusCode::OK, QUESTIONS_JSON);
    let app = setup_app(&gemini, &openai).await;

    let (status, body) = post_generate(
        app,
        json!({
            "subject": "cassandra",
            "difficulty": "easy",
            "num_questions": 2,
            "fallback_api_key": "sk-fallback",
            "fallback_model": "gpt-4o-mini"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["subject"], "cassandra");
    assert_eq!(gemini.hits(), 3);
    assert_eq!(openai.hits(), 1);

    let sent = openai.last_body();
    assert_eq!(sent["model"], "gpt-4o-mini");
    assert_eq!(sent["messages"][0]["role"], "system");
    assert!(sent["messages"][0]["content"]
        .as_str()
        .unwrap()
        .contains("Apache Cassandra"));
}

#[tokio::test]
async fn non_transient_gemini_error_without_fallback_is_a_server_error() {
    let gemini = Upstream::new(StatusCode::FORBIDDEN, "API key not valid");
    let openai = Upstream::new(StatusCode::OK, QUESTIONS_JSON);
    let app = setup_app(&gemini, &openai).await;

    let (status, body) = post_generate(
        app,
        json!({"subject": "r", "difficulty": "easy", "num_questions": 4, "fallback_api_key": ""}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Gemini failed:"), "detail: {detail}");
    assert!(detail.contains("No fallback API key provided"));
    assert_eq!(gemini.hits(), 1);
    assert_eq!(openai.hits(), 0);
}

#[tokio::test]
async fn both_providers_failing_reports_each_failure() {
    let gemini = Upstream::new(StatusCode::TOO_MANY_REQUESTS, "quota exhausted");
    let openai = Upstream::new(StatusCode::UNAUTHORIZED, "bad key");
    let app = setup_app(&gemini, &openai).await;

    let (status, body) = post_generate(
        app,
        json!({
            "subject": "mongodb",
            "difficulty": "medium",
            "num_questions": 5,
            "fallback_api_key": "sk-fallback"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("Gemini failed"));
    assert!(detail.contains("Fallback model gpt-3.5-turbo failed"));
    assert_eq!(openai.hits(), 1);
}

#[tokio::test]
async fn unparseable_reply_is_a_server_error() {
    let gemini = Upstream::new(StatusCode::OK, "Sorry, I can't produce questions right now.");
    let openai = Upstream::new(StatusCode::OK, "{}");
    let app = setup_app(&gemini, &openai).await;

    let (status, body) = post_generate(
        app,
        json!({"subject": "analytics", "difficulty": "easy", "num_questions": 5}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["detail"],
        "Failed to parse LLM response: Could not parse valid JSON from response"
    );
}

#[tokio::test]
async fn request_key_overrides_server_key() {
    let gemini = Upstream::new(StatusCode::OK, QUESTIONS_JSON);
    let openai = Upstream::new(StatusCode::OK, "{}");

    let seen_key = Arc::new(Mutex::new(None::<String>));
    let seen = seen_key.clone();
    let upstream = gemini.clone();
    let handler = move |headers: axum::http::HeaderMap, Json(body): Json<JsonValue>| {
        let seen = seen.clone();
        let upstream = upstream.clone();
        async move {
            *seen.lock().unwrap() = headers
                .get("x-goog-api-key")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            upstream.record(body);
            Json(json!({"candidates": [{"content": {"parts": [{"text": upstream.reply}]}}]}))
        }
    };
    let gemini_url = serve(Router::new().route("/v1beta/models/:model", post(handler))).await;
    let openai_url = fake_openai(openai).await;
    let state = tokio_test::assert_ok!(AppState::new(&test_config(&gemini_url, &openai_url)));
    let app = routes::api_router().with_state(state);

    let (status, _) = post_generate(
        app,
        json!({"subject": "java", "difficulty": "easy", "num_questions": 1, "api_key": "user-key"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(seen_key.lock().unwrap().as_deref(), Some("user-key"));
    assert_eq!(gemini.hits(), 1);
}
