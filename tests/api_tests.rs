//! End-to-end API tests: boot the server on an ephemeral port and exercise
//! registration, login, the auth gate and owner-scoped note operations over
//! real HTTP.

use std::sync::Arc;

use keepnotes::identity::TokenService;
use keepnotes::server::{router, AppState};
use keepnotes::store::Db;
use serde_json::{json, Value};
use tempfile::TempDir;

struct TestApp {
    base: String,
    client: reqwest::Client,
    // Keeps the SQLite directory alive for the duration of the test.
    _tmp: TempDir,
}

async fn spawn_app_with_secret(secret: &str) -> TestApp {
    let tmp = tempfile::tempdir().expect("tempdir");
    let db = Db::open(&tmp.path().join("notes.db")).expect("open db");
    let state = AppState {
        db: Arc::new(db),
        tokens: TokenService::new(secret),
    };
    let app = router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    TestApp {
        base: format!("http://{}", addr),
        client: reqwest::Client::new(),
        _tmp: tmp,
    }
}

async fn spawn_app() -> TestApp {
    spawn_app_with_secret("api-test-secret").await
}

impl TestApp {
    async fn register(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/api/auth/register", self.base))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("register request")
    }

    async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/api/auth/login", self.base))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("login request")
    }

    /// Register and log in, returning a valid bearer token.
    async fn token_for(&self, username: &str, password: &str) -> String {
        let resp = self.register(username, password).await;
        assert_eq!(resp.status().as_u16(), 201);
        let resp = self.login(username, password).await;
        assert_eq!(resp.status().as_u16(), 200);
        let body: Value = resp.json().await.expect("login body");
        body["token"].as_str().expect("token field").to_string()
    }

    async fn add_note(&self, token: &str, title: &str, content: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/api/notes/add", self.base))
            .bearer_auth(token)
            .json(&json!({ "title": title, "content": content }))
            .send()
            .await
            .expect("add note request")
    }

    async fn list_notes(&self, token: &str) -> reqwest::Response {
        self.client
            .get(format!("{}/api/notes", self.base))
            .bearer_auth(token)
            .send()
            .await
            .expect("list notes request")
    }

    async fn delete_note(&self, token: &str, id: &str) -> reqwest::Response {
        self.client
            .delete(format!("{}/api/notes/{}", self.base, id))
            .bearer_auth(token)
            .send()
            .await
            .expect("delete note request")
    }
}

#[tokio::test]
async fn full_note_lifecycle() {
    let app = spawn_app().await;

    // register alice
    let resp = app.register("alice", "secret123").await;
    assert_eq!(resp.status().as_u16(), 201);

    // wrong password
    let resp = app.login("alice", "wrong").await;
    assert_eq!(resp.status().as_u16(), 400);

    // correct password
    let resp = app.login("alice", "secret123").await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["username"], "alice");
    let token = body["token"].as_str().unwrap().to_string();

    // create a note
    let resp = app.add_note(&token, "x", "y").await;
    assert_eq!(resp.status().as_u16(), 201);
    let body: Value = resp.json().await.unwrap();
    let note_id = body["note"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["note"]["title"], "x");
    assert_eq!(body["note"]["content"], "y");

    // list shows exactly that note
    let resp = app.list_notes(&token).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    let notes = body["notes"].as_array().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["id"], note_id.as_str());

    // bob cannot delete alice's note
    let bob_token = app.token_for("bob", "hunter2hunter2").await;
    let resp = app.delete_note(&bob_token, &note_id).await;
    assert_eq!(resp.status().as_u16(), 404);

    // the note is still there for alice
    let resp = app.list_notes(&token).await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["notes"].as_array().unwrap().len(), 1);

    // alice deletes it and the list is empty
    let resp = app.delete_note(&token, &note_id).await;
    assert_eq!(resp.status().as_u16(), 200);
    let resp = app.list_notes(&token).await;
    let body: Value = resp.json().await.unwrap();
    assert!(body["notes"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = spawn_app().await;
    let resp = app.register("alice", "secret123").await;
    assert_eq!(resp.status().as_u16(), 201);
    let resp = app.register("alice", "other-password").await;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "User already exists");
}

#[tokio::test]
async fn wrong_password_and_unknown_user_are_indistinguishable() {
    let app = spawn_app().await;
    app.register("alice", "secret123").await;

    let wrong_pw = app.login("alice", "nope").await;
    let unknown = app.login("charlie", "nope").await;
    assert_eq!(wrong_pw.status().as_u16(), 400);
    assert_eq!(unknown.status().as_u16(), 400);
    let b1: Value = wrong_pw.json().await.unwrap();
    let b2: Value = unknown.json().await.unwrap();
    assert_eq!(b1, b2, "login failure bodies must not differ");
}

#[tokio::test]
async fn protected_routes_reject_missing_and_bad_tokens() {
    let app = spawn_app().await;

    // no Authorization header
    let resp = app
        .client
        .get(format!("{}/api/auth/welcome", app.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
    let missing_body: Value = resp.json().await.unwrap();

    // garbage token
    let resp = app
        .client
        .get(format!("{}/api/auth/welcome", app.base))
        .bearer_auth("not-a-real-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
    let garbage_body: Value = resp.json().await.unwrap();

    // token signed under a different secret
    let foreign = TokenService::new("some-other-secret").issue("u-1", "mallory");
    let resp = app.list_notes(&foreign).await;
    assert_eq!(resp.status().as_u16(), 403);
    let foreign_body: Value = resp.json().await.unwrap();

    // one client-visible outcome for every failure kind
    assert_eq!(missing_body, garbage_body);
    assert_eq!(garbage_body, foreign_body);
}

#[tokio::test]
async fn welcome_is_personalized() {
    let app = spawn_app().await;
    let token = app.token_for("alice", "secret123").await;
    let resp = app
        .client
        .get(format!("{}/api/auth/welcome", app.base))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Welcome, alice!");
}

#[tokio::test]
async fn listing_never_shows_foreign_notes() {
    let app = spawn_app().await;
    let alice = app.token_for("alice", "secret123").await;
    let bob = app.token_for("bob", "hunter2hunter2").await;

    app.add_note(&alice, "alice note", "private").await;
    app.add_note(&bob, "bob note", "also private").await;

    let body: Value = app.list_notes(&alice).await.json().await.unwrap();
    let notes = body["notes"].as_array().unwrap().clone();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["title"], "alice note");

    let body: Value = app.list_notes(&bob).await.json().await.unwrap();
    let notes = body["notes"].as_array().unwrap().clone();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["title"], "bob note");
}

#[tokio::test]
async fn delete_of_unknown_id_is_404() {
    let app = spawn_app().await;
    let token = app.token_for("alice", "secret123").await;
    let resp = app.delete_note(&token, "00000000-0000-0000-0000-000000000000").await;
    assert_eq!(resp.status().as_u16(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Note not found or unauthorized");
}

#[tokio::test]
async fn liveness_probe() {
    let app = spawn_app().await;
    let resp = app.client.get(app.base.clone()).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.text().await.unwrap(), "keepnotes ok");
}
