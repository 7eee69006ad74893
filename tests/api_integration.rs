//! Integration tests for the HTTP API.
//!
//! Each test spins up an Axum server on a random port backed by an in-memory
//! database and drives the real REST contract with reqwest.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use brand_pulse::auth::{AuthService, AuthSettings, Mailer};
use brand_pulse::error::MailError;
use brand_pulse::server::{self, AppState};
use brand_pulse::store::{Database, LibSqlBackend};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Mailer that keeps the last code per recipient instead of sending it.
#[derive(Default)]
struct CaptureMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl CaptureMailer {
    fn code_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
    }

    fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for CaptureMailer {
    async fn send_code(&self, to: &str, code: &str) -> Result<(), MailError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), code.to_string()));
        Ok(())
    }
}

struct TestServer {
    base: String,
    client: Client,
    mailer: Arc<CaptureMailer>,
}

/// Start a server with `jane@example.com` on the allow-list, plus any
/// `extra` emails.
async fn start_server_with(expose_diagnostics: bool, extra: &[&str]) -> TestServer {
    let db: Arc<dyn Database> = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    db.add_approved_email("jane@example.com", None).await.unwrap();
    for email in extra {
        db.add_approved_email(email, None).await.unwrap();
    }

    let mailer = Arc::new(CaptureMailer::default());
    let auth = Arc::new(AuthService::new(
        Arc::clone(&db),
        mailer.clone(),
        AuthSettings::default(),
    ));
    let state = AppState::new(db, auth, expose_diagnostics);
    let app = server::build_router(state, server::cors_layer(None).unwrap());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer {
        base: format!("http://127.0.0.1:{port}"),
        client: Client::new(),
        mailer,
    }
}

async fn start_server(expose_diagnostics: bool) -> TestServer {
    start_server_with(expose_diagnostics, &[]).await
}

impl TestServer {
    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let resp = self
            .client
            .post(format!("{}{path}", self.base))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn authed(
        &self,
        method: reqwest::Method,
        path: &str,
        token: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = self
            .client
            .request(method, format!("{}{path}", self.base))
            .bearer_auth(token);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req.send().await.unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    /// Run the whole OTP sign-in and return the session token.
    async fn sign_in(&self, email: &str) -> String {
        let (status, _) = self.post("/api/auth/otp", json!({"email": email})).await;
        assert_eq!(status, StatusCode::OK);
        let code = self.mailer.code_for(email).expect("code was mailed");
        let (status, body) = self
            .post("/api/auth/verify", json!({"email": email, "code": code}))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["session"]["token"].as_str().unwrap().to_string()
    }
}

// ── Health ───────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_ok() {
    timeout(TEST_TIMEOUT, async {
        let srv = start_server(true).await;
        let body: Value = srv
            .client
            .get(format!("{}/health", srv.base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
    })
    .await
    .expect("test timed out");
}

// ── Auth ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn approval_is_case_insensitive() {
    timeout(TEST_TIMEOUT, async {
        let srv = start_server(true).await;
        let (status, body) = srv
            .post("/api/auth/check", json!({"email": "Jane@Example.com "}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["approved"], true);
        assert_eq!(body["email"], "jane@example.com");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unapproved_email_is_denied_before_any_code() {
    timeout(TEST_TIMEOUT, async {
        let srv = start_server(true).await;

        let (status, body) = srv
            .post("/api/auth/otp", json!({"email": "mallory@example.com"}))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["notification"]["title"], "Access denied");

        let (status, _) = srv
            .post(
                "/api/auth/signup",
                json!({"email": "mallory@example.com", "full_name": "Mallory"}),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(srv.mailer.count(), 0);

        let body: Value = srv
            .client
            .get(format!("{}/api/auth/flow?email=mallory@example.com", srv.base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["state"], "denied");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn sign_in_session_and_sign_out() {
    timeout(TEST_TIMEOUT, async {
        let srv = start_server(true).await;
        let token = srv.sign_in("jane@example.com").await;

        let (status, body) = srv
            .authed(reqwest::Method::GET, "/api/auth/session", &token, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session"]["email"], "jane@example.com");

        let (status, _) = srv
            .authed(reqwest::Method::POST, "/api/auth/signout", &token, None)
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = srv
            .authed(reqwest::Method::GET, "/api/auth/session", &token, None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["notification"]["title"], "Not signed in");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn wrong_code_then_right_code() {
    timeout(TEST_TIMEOUT, async {
        let srv = start_server(true).await;
        srv.post("/api/auth/otp", json!({"email": "jane@example.com"}))
            .await;
        let code = srv.mailer.code_for("jane@example.com").unwrap();
        let wrong = if code.starts_with('0') { "1" } else { "0" }.repeat(code.len());

        let (status, body) = srv
            .post(
                "/api/auth/verify",
                json!({"email": "jane@example.com", "code": wrong}),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["notification"]["title"], "Invalid code");

        let (status, _) = srv
            .post(
                "/api/auth/verify",
                json!({"email": "jane@example.com", "code": code}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        // Codes verify once.
        let (status, _) = srv
            .post(
                "/api/auth/verify",
                json!({"email": "jane@example.com", "code": code}),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn signup_stores_profile() {
    timeout(TEST_TIMEOUT, async {
        let srv = start_server(true).await;
        let (status, body) = srv
            .post(
                "/api/auth/signup",
                json!({"email": "Jane@Example.com", "full_name": "Jane Doe", "company": "Acme"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["state"], "code_requested");

        let code = srv.mailer.code_for("jane@example.com").unwrap();
        let (_, body) = srv
            .post(
                "/api/auth/verify",
                json!({"email": "jane@example.com", "code": code}),
            )
            .await;
        let token = body["session"]["token"].as_str().unwrap().to_string();

        let (_, body) = srv
            .authed(reqwest::Method::GET, "/api/auth/session", &token, None)
            .await;
        assert_eq!(body["profile"]["full_name"], "Jane Doe");
    })
    .await
    .expect("test timed out");
}

// ── Wizard ───────────────────────────────────────────────────────────

#[tokio::test]
async fn wizard_requires_session() {
    timeout(TEST_TIMEOUT, async {
        let srv = start_server(true).await;
        let (status, _) = srv.post("/api/wizard", json!({})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn wizard_full_walkthrough() {
    use reqwest::Method;

    timeout(TEST_TIMEOUT, async {
        let srv = start_server(true).await;
        let token = srv.sign_in("jane@example.com").await;

        let (status, body) = srv.authed(Method::POST, "/api/wizard", &token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["wizard"]["current_step"], "brand-info");
        let id = body["wizard"]["id"].as_str().unwrap().to_string();

        // Blocked on an empty brand.
        let (status, body) = srv
            .authed(Method::POST, &format!("/api/wizard/{id}/next"), &token, None)
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["notification"]["title"], "Brand name required");

        srv.authed(
            Method::PUT,
            &format!("/api/wizard/{id}/brand"),
            &token,
            Some(json!({"name": "Acme", "website": "https://acme.test"})),
        )
        .await;

        let items = [
            json!({"kind": "product", "item": {"id": "p1", "name": "Rockets", "category": "Aerospace"}}),
            json!({"kind": "topic", "item": {"id": "t1", "name": "Pricing"}}),
            json!({"kind": "persona", "item": {"id": "pe1", "name": "Founder", "description": "Buys tools"}}),
            json!({"kind": "question", "item": {"id": "q1", "text": "Best rocket vendor?"}}),
        ];
        for item in items {
            let (status, body) = srv
                .authed(
                    Method::POST,
                    &format!("/api/wizard/{id}/items"),
                    &token,
                    Some(item),
                )
                .await;
            assert_eq!(status, StatusCode::OK, "{body}");
            let (status, body) = srv
                .authed(Method::POST, &format!("/api/wizard/{id}/next"), &token, None)
                .await;
            assert_eq!(status, StatusCode::OK, "{body}");
        }

        let (_, steps) = srv
            .authed(Method::GET, &format!("/api/wizard/{id}/steps"), &token, None)
            .await;
        let steps = steps.as_array().unwrap();
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[4]["step"], "review");
        assert_eq!(steps[4]["current"], true);

        let (status, body) = srv
            .authed(Method::POST, &format!("/api/wizard/{id}/submit"), &token, None)
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["wizard"]["submitted"], true);
        assert_eq!(body["notification"]["level"], "success");

        let (status, _) = srv
            .authed(Method::POST, &format!("/api/wizard/{id}/prev"), &token, None)
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn empty_topics_block_with_notification() {
    use reqwest::Method;

    timeout(TEST_TIMEOUT, async {
        let srv = start_server(true).await;
        let token = srv.sign_in("jane@example.com").await;
        let (_, body) = srv.authed(Method::POST, "/api/wizard", &token, None).await;
        let id = body["wizard"]["id"].as_str().unwrap().to_string();

        srv.authed(
            Method::PUT,
            &format!("/api/wizard/{id}/brand"),
            &token,
            Some(json!({"name": "Acme", "website": "https://acme.test"})),
        )
        .await;
        srv.authed(
            Method::POST,
            &format!("/api/wizard/{id}/items"),
            &token,
            Some(json!({"kind": "product", "item": {"id": "p1", "name": "Rockets", "category": "Aerospace"}})),
        )
        .await;
        srv.authed(Method::POST, &format!("/api/wizard/{id}/next"), &token, None)
            .await;

        let (status, body) = srv
            .authed(Method::POST, &format!("/api/wizard/{id}/next"), &token, None)
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["notification"]["title"], "No topics selected");

        let (_, body) = srv
            .authed(Method::GET, &format!("/api/wizard/{id}"), &token, None)
            .await;
        assert_eq!(body["wizard"]["current_step"], "topics");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn wizard_of_another_user_is_not_found() {
    use reqwest::Method;

    timeout(TEST_TIMEOUT, async {
        let srv = start_server_with(true, &["bob@example.com"]).await;
        let jane = srv.sign_in("jane@example.com").await;
        let bob = srv.sign_in("bob@example.com").await;

        let (_, body) = srv.authed(Method::POST, "/api/wizard", &jane, None).await;
        let id = body["wizard"]["id"].as_str().unwrap().to_string();

        let (status, _) = srv
            .authed(Method::GET, &format!("/api/wizard/{id}"), &bob, None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = srv
            .authed(Method::GET, &format!("/api/wizard/{id}"), "not-a-token", None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = srv
            .authed(Method::GET, &format!("/api/wizard/{id}"), &jane, None)
            .await;
        assert_eq!(status, StatusCode::OK);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn wizard_list_is_scoped_to_owner() {
    use reqwest::Method;

    timeout(TEST_TIMEOUT, async {
        let srv = start_server_with(true, &["bob@example.com"]).await;
        let jane = srv.sign_in("jane@example.com").await;
        let bob = srv.sign_in("bob@example.com").await;

        let (_, first) = srv.authed(Method::POST, "/api/wizard", &jane, None).await;
        srv.authed(Method::POST, "/api/wizard", &jane, None).await;
        srv.authed(Method::POST, "/api/wizard", &bob, None).await;

        let (status, body) = srv.authed(Method::GET, "/api/wizard", &jane, None).await;
        assert_eq!(status, StatusCode::OK);
        let listed = body.as_array().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0]["wizard"]["id"], first["wizard"]["id"]);
        assert!(listed.iter().all(|w| w["wizard"]["owner"] == "jane@example.com"));

        let (_, body) = srv.authed(Method::GET, "/api/wizard", &bob, None).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, _) = srv.authed(Method::GET, "/api/wizard", "not-a-token", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn suggestions_per_step() {
    timeout(TEST_TIMEOUT, async {
        let srv = start_server(true).await;
        let body: Value = srv
            .client
            .get(format!("{}/api/wizard/suggestions/topics", srv.base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let items = body.as_array().unwrap();
        assert!(!items.is_empty());
        assert!(items.iter().all(|i| i["kind"] == "topic"));

        let status = srv
            .client
            .get(format!("{}/api/wizard/suggestions/nowhere", srv.base))
            .send()
            .await
            .unwrap()
            .status();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    })
    .await
    .expect("test timed out");
}

// ── Search / sandbox ─────────────────────────────────────────────────

#[tokio::test]
async fn search_and_sandbox() {
    use reqwest::Method;

    timeout(TEST_TIMEOUT, async {
        let srv = start_server(true).await;
        let token = srv.sign_in("jane@example.com").await;

        let (status, body) = srv
            .authed(Method::GET, "/api/search?q=crm&model=perplexity", &token, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["report"]["total_questions"], 1);
        assert_eq!(body["report"]["by_model"]["Perplexity"], 1);

        let (status, _) = srv
            .authed(Method::GET, "/api/search?sentiment=angry", &token, None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = srv
            .authed(
                Method::POST,
                "/api/sandbox",
                &token,
                Some(json!({"prompt": "best CRM?", "brand": "Acme"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["responses"].as_array().unwrap().len(), 4);

        let (status, body) = srv
            .authed(Method::POST, "/api/sandbox", &token, Some(json!({"prompt": ""})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["notification"]["title"], "Prompt required");
    })
    .await
    .expect("test timed out");
}

// ── Content ──────────────────────────────────────────────────────────

#[tokio::test]
async fn content_read_and_write() {
    use reqwest::Method;

    timeout(TEST_TIMEOUT, async {
        let srv = start_server(true).await;

        let status = srv
            .client
            .get(format!("{}/api/content/hero", srv.base))
            .send()
            .await
            .unwrap()
            .status();
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = srv
            .authed(Method::PUT, "/api/content/hero", "bogus", Some(json!({"title": "Hi"})))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token = srv.sign_in("jane@example.com").await;
        let (status, _) = srv
            .authed(Method::PUT, "/api/content/hero", &token, Some(json!({"title": "Hi"})))
            .await;
        assert_eq!(status, StatusCode::OK);

        let body: Value = srv
            .client
            .get(format!("{}/api/content/hero", srv.base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["value"]["title"], "Hi");
    })
    .await
    .expect("test timed out");
}

// ── Functions ────────────────────────────────────────────────────────

#[tokio::test]
async fn meeting_notification_stores_request() {
    timeout(TEST_TIMEOUT, async {
        let srv = start_server(true).await;
        let (status, body) = srv
            .post(
                "/functions/v1/send-meeting-notification",
                json!({"meetingData": {
                    "full_name": "Bob Smith",
                    "email": "bob@example.com",
                    "company": "Widgets",
                    "message": "Demo please"
                }}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "emailSent": false}));

        let (status, body) = srv
            .post(
                "/functions/v1/send-meeting-notification",
                json!({"meetingData": {"full_name": "Bob"}}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("email"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn verify_email_exists_reports_matches() {
    timeout(TEST_TIMEOUT, async {
        let srv = start_server(true).await;
        let (status, body) = srv
            .post(
                "/functions/v1/verify-email-exists",
                json!({"email": "JANE@example.com"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["normalizedEmail"], "jane@example.com");
        assert_eq!(body["exactMatch"], false);
        assert_eq!(body["caseInsensitiveMatch"], true);
        assert_eq!(body["approvedEmails"], json!(["jane@example.com"]));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn verify_email_exists_hidden_without_diagnostics() {
    timeout(TEST_TIMEOUT, async {
        let srv = start_server(false).await;
        let (status, body) = srv
            .post(
                "/functions/v1/verify-email-exists",
                json!({"email": "jane@example.com"}),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    })
    .await
    .expect("test timed out");
}
