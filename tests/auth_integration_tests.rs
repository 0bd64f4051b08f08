use axum::{
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
};
use blog_api::{
    ApiError, AppState, InMemoryRepository,
    auth::{AuthUser, Claims, DEV_USER_HEADER},
    config::{AppConfig, Env},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::{sync::Arc, time::SystemTime};
use uuid::Uuid;

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_USER_ID: Uuid = Uuid::from_u128(1);

fn now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn create_token(user_id: Uuid, issued_at: u64, expires_at: u64, secret: &str) -> String {
    let claims = Claims {
        sub: user_id,
        iat: issued_at as usize,
        exp: expires_at as usize,
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn valid_token(user_id: Uuid) -> String {
    let now = now();
    create_token(user_id, now, now + 3600, TEST_JWT_SECRET)
}

fn create_app_state(env: Env, repo: InMemoryRepository) -> AppState {
    let config = AppConfig {
        env,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    };

    AppState {
        repo: Arc::new(repo),
        config,
    }
}

fn known_user_repo() -> InMemoryRepository {
    InMemoryRepository::new().with_user(TEST_USER_ID, "alice")
}

fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn with_bearer(parts: &mut Parts, token: &str) {
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
}

fn with_dev_user(parts: &mut Parts, user_id: Uuid) {
    parts.headers.insert(
        header::HeaderName::from_static(DEV_USER_HEADER),
        header::HeaderValue::from_str(&user_id.to_string()).unwrap(),
    );
}

fn assert_unauthenticated(result: Result<AuthUser, ApiError>) {
    let err = result.expect_err("request should be rejected");
    assert!(matches!(err, ApiError::Unauthenticated), "got {err:?}");
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
}

// --- Tests ---

#[tokio::test]
async fn test_auth_success_with_valid_jwt() {
    let app_state = create_app_state(Env::Production, known_user_repo());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    with_bearer(&mut parts, &valid_token(TEST_USER_ID));

    let user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .expect("valid token should authenticate");

    assert_eq!(user.id, TEST_USER_ID);
    assert_eq!(user.username, "alice");
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let app_state = create_app_state(Env::Production, known_user_repo());
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    assert_unauthenticated(AuthUser::from_request_parts(&mut parts, &app_state).await);
}

#[tokio::test]
async fn test_auth_failure_with_non_bearer_scheme() {
    let app_state = create_app_state(Env::Production, known_user_repo());
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_static("Basic YWxpY2U6c2VjcmV0"),
    );

    assert_unauthenticated(AuthUser::from_request_parts(&mut parts, &app_state).await);
}

#[tokio::test]
async fn test_auth_failure_with_expired_jwt() {
    // Well past the default 60s leeway.
    let now = now();
    let token = create_token(TEST_USER_ID, now - 7200, now - 3600, TEST_JWT_SECRET);

    let app_state = create_app_state(Env::Production, known_user_repo());
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    with_bearer(&mut parts, &token);

    assert_unauthenticated(AuthUser::from_request_parts(&mut parts, &app_state).await);
}

#[tokio::test]
async fn test_auth_failure_with_wrong_signature() {
    let now = now();
    let token = create_token(TEST_USER_ID, now, now + 3600, "some-other-secret");

    let app_state = create_app_state(Env::Production, known_user_repo());
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    with_bearer(&mut parts, &token);

    assert_unauthenticated(AuthUser::from_request_parts(&mut parts, &app_state).await);
}

#[tokio::test]
async fn test_auth_failure_for_unknown_subject() {
    // Valid signature, but the user no longer exists.
    let app_state = create_app_state(Env::Production, known_user_repo());
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    with_bearer(&mut parts, &valid_token(Uuid::new_v4()));

    assert_unauthenticated(AuthUser::from_request_parts(&mut parts, &app_state).await);
}

#[tokio::test]
async fn test_local_bypass_success() {
    let dev_user_id = Uuid::new_v4();
    let repo = InMemoryRepository::new().with_user(dev_user_id, "local-dev");
    let app_state = create_app_state(Env::Local, repo);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    with_dev_user(&mut parts, dev_user_id);

    let user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .expect("dev header should authenticate locally");

    assert_eq!(user.id, dev_user_id);
    assert_eq!(user.username, "local-dev");
}

#[tokio::test]
async fn test_local_bypass_unknown_user_falls_through() {
    // Unknown dev user and no bearer token.
    let app_state = create_app_state(Env::Local, known_user_repo());
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    with_dev_user(&mut parts, Uuid::new_v4());

    assert_unauthenticated(AuthUser::from_request_parts(&mut parts, &app_state).await);
}

#[tokio::test]
async fn test_local_mode_still_accepts_jwt() {
    let app_state = create_app_state(Env::Local, known_user_repo());
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    with_bearer(&mut parts, &valid_token(TEST_USER_ID));

    let user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .expect("bearer tokens work in every mode");
    assert_eq!(user.id, TEST_USER_ID);
}

#[tokio::test]
async fn test_local_bypass_disabled_in_prod() {
    let app_state = create_app_state(Env::Production, known_user_repo());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    with_dev_user(&mut parts, TEST_USER_ID);

    assert_unauthenticated(AuthUser::from_request_parts(&mut parts, &app_state).await);
}
