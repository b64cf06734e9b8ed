//! In-memory store doubles and request helpers for router tests.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use time::OffsetDateTime;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    app::build_app,
    auth::{
        repo::{UserStore, UserStoreError},
        repo_types::{NewUser, User},
    },
    config::AppConfig,
    reminders::{
        dto::ReminderFields,
        repo::{ReminderStore, PAGE_SIZE},
        repo_types::Reminder,
    },
    state::AppState,
};

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, UserStoreError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(UserStoreError::EmailTaken);
        }
        let row = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            created_at: OffsetDateTime::now_utc(),
            last_login: None,
        };
        users.push(row.clone());
        Ok(row)
    }

    async fn update_last_login(&self, id: Uuid) -> anyhow::Result<User> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| anyhow::anyhow!("no user {id}"))?;
        user.last_login = Some(OffsetDateTime::now_utc());
        Ok(user.clone())
    }
}

/// Counts every call so tests can assert the store was never touched.
#[derive(Default)]
pub struct MemoryReminderStore {
    rows: Mutex<Vec<Reminder>>,
    calls: AtomicUsize,
}

impl MemoryReminderStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ReminderStore for MemoryReminderStore {
    async fn list_for_owner(&self, owner: Uuid) -> anyhow::Result<Vec<Reminder>> {
        self.touch();
        let mut rows: Vec<Reminder> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == owner)
            .cloned()
            .collect();
        // Option orders None first, matching NULLS FIRST.
        rows.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        rows.truncate(PAGE_SIZE as usize);
        Ok(rows)
    }

    async fn get_for_owner(&self, owner: Uuid, id: Uuid) -> anyhow::Result<Option<Reminder>> {
        self.touch();
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|r| r.id == id && r.user_id == owner)
            .cloned())
    }

    async fn insert(&self, owner: Uuid, fields: ReminderFields) -> anyhow::Result<Reminder> {
        self.touch();
        let row = Reminder {
            id: Uuid::new_v4(),
            user_id: owner,
            title: fields.title,
            description: fields.description,
            date: fields.date,
            completed: fields.completed,
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn update_for_owner(
        &self,
        owner: Uuid,
        id: Uuid,
        fields: ReminderFields,
    ) -> anyhow::Result<Option<Reminder>> {
        self.touch();
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|r| r.id == id && r.user_id == owner) else {
            return Ok(None);
        };
        row.title = fields.title;
        row.description = fields.description;
        row.date = fields.date;
        row.completed = fields.completed;
        Ok(Some(row.clone()))
    }

    async fn delete_for_owner(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
        self.touch();
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !(r.id == id && r.user_id == owner));
        Ok(rows.len() < before)
    }
}

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub reminders: Arc<MemoryReminderStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::for_tests())
    }

    pub fn with_auth_limit(max_requests: usize) -> Self {
        let mut config = AppConfig::for_tests();
        config.auth_rate_limit.max_requests = max_requests;
        Self::with_config(config)
    }

    fn with_config(config: AppConfig) -> Self {
        let reminders = Arc::new(MemoryReminderStore::default());
        let state = AppState::from_parts(
            Arc::new(config),
            Arc::new(MemoryUserStore::default()),
            reminders.clone(),
        );
        Self {
            router: build_app(state.clone()),
            state,
            reminders,
        }
    }
}

/// Builds a request; a `null` body means no body at all.
pub fn json_request(method: Method, uri: &str, bearer: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    if body.is_null() {
        return builder.body(Body::empty()).unwrap();
    }
    builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Sends one request through the router; an empty body reads as `null`.
pub async fn call(app: &TestApp, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let res = app.router.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

pub async fn register(app: &TestApp, email: &str, password: &str) -> Value {
    let (status, _, body) = call(
        app,
        json_request(
            Method::POST,
            "/auth/register",
            None,
            json!({ "email": email, "password": password, "name": "Test User" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body
}

/// Registers and logs in; returns the token from the `token` cookie.
pub async fn login_token(app: &TestApp, email: &str) -> (String, Uuid) {
    register(app, email, "password123").await;
    let (status, headers, body) = call(
        app,
        json_request(
            Method::POST,
            "/auth/login",
            None,
            json!({ "email": email, "password": "password123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");

    let cookie = headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    let token = cookie
        .strip_prefix("token=")
        .and_then(|rest| rest.split(';').next())
        .unwrap()
        .to_string();
    let user_id = Uuid::parse_str(body["data"]["id"].as_str().unwrap()).unwrap();
    (token, user_id)
}
