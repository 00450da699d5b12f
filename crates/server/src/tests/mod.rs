// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Command-line parsing tests and router tests driven through
//! `tower::ServiceExt::oneshot`.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use std::sync::Arc;

use agri_connect_api::{AuthenticatedActor, Role, TokenAuthority};
use agri_connect_persistence::Persistence;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use time::{Duration, OffsetDateTime};
use tower::ServiceExt;

use crate::notify::NotificationDispatcher;
use crate::{AppState, build_router};

const TEST_SECRET: &[u8] = b"router-test-secret-long-enough-for-hs256";

pub struct TestServer {
    pub app: Router,
    pub state: AppState,
    authority: Arc<TokenAuthority>,
}

/// A decoded response.
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

pub fn create_test_server() -> TestServer {
    let authority: Arc<TokenAuthority> = Arc::new(TokenAuthority::new(TEST_SECRET));
    let state: AppState = AppState {
        persistence: Persistence::new_in_memory().unwrap(),
        identity: authority.clone(),
        notifier: NotificationDispatcher::new(),
    };

    TestServer {
        app: build_router(state.clone()),
        state,
        authority,
    }
}

/// A date the request validator will accept.
pub fn tomorrow() -> String {
    (OffsetDateTime::now_utc().date() + Duration::days(1)).to_string()
}

impl TestServer {
    /// Registers a user and returns a token for them.
    pub fn token_for(&self, username: &str, role: Role) -> String {
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        let user_id: i64 = self
            .state
            .persistence
            .create_user(username, role.as_str(), now)
            .unwrap();
        self.authority
            .issue(
                &AuthenticatedActor::new(user_id, role),
                Duration::hours(1),
                now,
            )
            .unwrap()
    }

    pub async fn send_raw(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> (StatusCode, String) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request: Request<Body> = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status: StatusCode = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let (status, text) = self
            .send_raw(method, uri, token, body.map(|b| b.to_string()))
            .await;
        TestResponse {
            status,
            body: serde_json::from_str(&text).unwrap(),
        }
    }
}
