//! In-process HTTP scenarios against a warden router.
//!
//! A [`Scenario`] collects a request, sends it through the router with
//! `oneshot`, and hands back a [`ScenarioAssert`] for chained checks.
//!
//! ```rust,ignore
//! let app = warden::router(warden::testing::test_state());
//!
//! warden::testing::post(app, "/auth/refresh-token")
//!     .json_body(&json!({"token": "garbage"}))
//!     .execute()
//!     .await
//!     .assert_error(StatusCode::UNAUTHORIZED, "Unauthorized: invalid token")
//!     .await;
//! ```

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode, header},
    response::Response,
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tower::ServiceExt;

/// A request under construction.
pub struct Scenario {
    app: Router,
    method: Method,
    uri: String,
    headers: HeaderMap,
    body: Body,
}

impl Scenario {
    pub fn new(app: Router, method: Method, uri: &str) -> Self {
        Self {
            app,
            method,
            uri: uri.to_string(),
            headers: HeaderMap::new(),
            body: Body::empty(),
        }
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        let name = HeaderName::from_bytes(key.as_bytes())
            .unwrap_or_else(|e| panic!("invalid header name '{}': {}", key, e));
        let value = HeaderValue::from_str(value)
            .unwrap_or_else(|e| panic!("invalid value for header '{}': {}", key, e));
        self.headers.insert(name, value);
        self
    }

    /// Present `token` the way a client of the gated routes does.
    pub fn bearer_token(self, token: &str) -> Self {
        self.header("authorization", &format!("Bearer {}", token))
    }

    pub fn json_body<T: Serialize>(mut self, body: &T) -> Self {
        let json = serde_json::to_vec(body).expect("body serializes to JSON");
        self.body = Body::from(json);
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self
    }

    /// Raw body, e.g. to send malformed JSON.
    pub fn text_body(mut self, body: impl Into<String>) -> Self {
        self.body = Body::from(body.into());
        self
    }

    pub async fn execute(self) -> ScenarioAssert {
        let mut request = Request::builder()
            .method(self.method)
            .uri(self.uri.as_str())
            .body(self.body)
            .unwrap_or_else(|e| panic!("invalid request for '{}': {}", self.uri, e));
        *request.headers_mut() = self.headers;

        let response = self
            .app
            .oneshot(request)
            .await
            .unwrap_or_else(|never| match never {});
        ScenarioAssert { response }
    }
}

/// Chained checks over a response.
pub struct ScenarioAssert {
    response: Response,
}

impl ScenarioAssert {
    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.response.status(),
            expected,
            "expected status {}, got {}",
            expected,
            self.response.status()
        );
        self
    }

    pub fn assert_ok(self) -> Self {
        self.assert_status(StatusCode::OK)
    }

    pub fn assert_created(self) -> Self {
        self.assert_status(StatusCode::CREATED)
    }

    pub fn assert_bad_request(self) -> Self {
        self.assert_status(StatusCode::BAD_REQUEST)
    }

    pub fn assert_unauthorized(self) -> Self {
        self.assert_status(StatusCode::UNAUTHORIZED)
    }

    pub fn assert_forbidden(self) -> Self {
        self.assert_status(StatusCode::FORBIDDEN)
    }

    pub fn assert_not_found(self) -> Self {
        self.assert_status(StatusCode::NOT_FOUND)
    }

    pub fn assert_conflict(self) -> Self {
        self.assert_status(StatusCode::CONFLICT)
    }

    pub fn assert_json(self) -> Self {
        let content_type = self
            .response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(
            content_type.starts_with("application/json"),
            "expected a JSON response, got content type '{}'",
            content_type
        );
        self
    }

    /// Deserialize the body, consuming the response.
    pub async fn json<T: DeserializeOwned>(self) -> T {
        let bytes = axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .expect("response body is readable");
        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            panic!(
                "response is not the expected JSON ({}): {}",
                e,
                String::from_utf8_lossy(&bytes)
            )
        })
    }

    /// Check one field addressed by a dotted path, e.g. `checks.0.name`.
    pub async fn assert_json_path(self, path: &str, expected: Value) -> Self {
        let (status, body) = self.into_value().await;
        let actual = lookup(&body, path)
            .unwrap_or_else(|| panic!("'{}' missing from response {}", path, body));
        assert_eq!(actual, &expected, "'{}' mismatch in response {}", path, body);
        Self::rebuild(status, &body)
    }

    /// Check the `{error, error_id}` body every failed request carries.
    pub async fn assert_error(self, status: StatusCode, message: &str) -> Self {
        let this = self.assert_status(status).assert_json();
        let (status, body) = this.into_value().await;

        assert_eq!(body["error"], message, "error message mismatch in {}", body);
        let error_id = body["error_id"].as_str().unwrap_or_default();
        assert!(
            uuid::Uuid::parse_str(error_id).is_ok(),
            "error_id '{}' is not a UUID",
            error_id
        );
        Self::rebuild(status, &body)
    }

    async fn into_value(self) -> (StatusCode, Value) {
        let status = self.response.status();
        (status, self.json().await)
    }

    fn rebuild(status: StatusCode, body: &Value) -> Self {
        let mut response = Response::new(Body::from(body.to_string()));
        *response.status_mut() = status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Self { response }
    }
}

fn lookup<'a>(json: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(json, |node, part| match part.parse::<usize>() {
        Ok(index) => node.get(index),
        Err(_) => node.get(part),
    })
}

pub fn get(app: Router, uri: &str) -> Scenario {
    Scenario::new(app, Method::GET, uri)
}

pub fn post(app: Router, uri: &str) -> Scenario {
    Scenario::new(app, Method::POST, uri)
}

pub fn put(app: Router, uri: &str) -> Scenario {
    Scenario::new(app, Method::PUT, uri)
}

pub fn delete(app: Router, uri: &str) -> Scenario {
    Scenario::new(app, Method::DELETE, uri)
}
