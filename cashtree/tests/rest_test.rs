//! HTTP layer tests against a wiremock server: bearer auth, envelope
//! normalization, and the error taxonomy (401 / 409 / generic / unreachable).

use cashtree::{
    AuthSession, Cashtree, CashtreeConfig, CashtreeError, CashtreeHttpClient, Role, TransferKind,
    TransferRequest, UpdateUserRequest,
};
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_json(id: &str, username: &str, balance: i64) -> serde_json::Value {
    json!({
        "_id": id,
        "username": username,
        "role": "User",
        "balance": balance,
        "userdate": "2024-04-01T00:00:00Z"
    })
}

#[tokio::test]
async fn test_login_returns_session_and_arms_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "username": "ops_root", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok123",
            "user": user_json("u1", "ops_root", 1000),
            "message": "ok"
        })))
        .mount(&server)
        .await;

    let mut client = Cashtree::new(CashtreeConfig::new(server.uri()));
    let session = client.login("ops_root", "pw").await.unwrap();
    assert_eq!(session.token, "tok123");
    assert_eq!(session.user.username, "ops_root");
    assert_eq!(client.http_client.token(), Some("tok123"));
}

#[tokio::test]
async fn test_authenticated_request_carries_bearer_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/getallusers"))
        .and(header("authorization", "Bearer tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [user_json("u1", "ops_root", 1000)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = AuthSession {
        token: "tok123".into(),
        user: serde_json::from_value(user_json("u1", "ops_root", 1000)).unwrap(),
    };
    let client = Cashtree::with_session(CashtreeConfig::new(server.uri()), &session);
    let users = client.all_users().await.unwrap();
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn test_subtree_fetch_normalizes_users_key() {
    let server = MockServer::start().await;
    // Older backends wrap the subtree in `users` even though it is one node.
    Mock::given(method("GET"))
        .and(path("/auth/usersByCreater/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": {
                "_id": "u1",
                "username": "ops_root",
                "children": [
                    { "_id": "u2", "username": "partner_a", "balance": 5 }
                ]
            }
        })))
        .mount(&server)
        .await;

    let client = Cashtree::new(CashtreeConfig::new(server.uri()));
    let tree = client.fetch_tree("u1").await.unwrap();
    assert_eq!(tree.username, "ops_root");
    assert_eq!(tree.children.len(), 1);
    assert_eq!(tree.children[0].balance, dec!(5));
}

#[tokio::test]
async fn test_unauthorized_maps_to_invalid_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Wrong password" })),
        )
        .mount(&server)
        .await;

    let mut client = Cashtree::new(CashtreeConfig::new(server.uri()));
    let err = client.login("ops_root", "bad").await.unwrap_err();
    assert!(matches!(err, CashtreeError::InvalidCredentials(_)));
    assert_eq!(err.status(), 401);
    assert!(err.to_string().contains("Wrong password"));
}

#[tokio::test]
async fn test_conflict_maps_distinctly() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "already registered" })),
        )
        .mount(&server)
        .await;

    let client = Cashtree::new(CashtreeConfig::new(server.uri()));
    let err = client
        .register("taken_name", "pw", Role::User, "u1")
        .await
        .unwrap_err();
    assert!(matches!(err, CashtreeError::Conflict(_)));
    assert_eq!(err.status(), 409);
}

#[tokio::test]
async fn test_server_error_carries_status_and_body_message() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/auth/delete_user/u9"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .mount(&server)
        .await;

    let client = Cashtree::new(CashtreeConfig::new(server.uri()));
    let err = client.delete_user("u9").await.unwrap_err();
    match err {
        CashtreeError::Http { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_server_uses_500_sentinel() {
    // Nothing listens here.
    let client = CashtreeHttpClient::new("http://127.0.0.1:9");
    let err = client.get_all_users().await.unwrap_err();
    assert!(matches!(err, CashtreeError::Unreachable));
    assert_eq!(err.status(), 500);
}

#[tokio::test]
async fn test_register_validates_before_network() {
    // No mock mounted: a network call would fail the test with Unreachable.
    let client = CashtreeHttpClient::new("http://127.0.0.1:9");
    let err = client
        .register(&cashtree::RegisterRequest {
            username: "ab".into(),
            password: "pw".into(),
            role: Role::User,
            id: "u1".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CashtreeError::Validation(_)));
}

#[tokio::test]
async fn test_transfer_rejects_non_positive_amount_before_network() {
    let client = CashtreeHttpClient::new("http://127.0.0.1:9");
    let err = client
        .transfer(&TransferRequest {
            sender_id: "u1".into(),
            receiver_id: "u2".into(),
            amount: dec!(0),
            kind: TransferKind::Deposit,
            note: String::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CashtreeError::Validation(_)));
}

#[tokio::test]
async fn test_update_user_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/auth/update"))
        .and(body_json(json!({ "userId": "u2", "role": "Admin" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "updated",
            "user": { "_id": "u2", "username": "partner_a", "role": "Admin", "balance": 5 }
        })))
        .mount(&server)
        .await;

    let client = Cashtree::new(CashtreeConfig::new(server.uri()));
    let response = client
        .update_user(&UpdateUserRequest {
            user_id: "u2".into(),
            role: Some(Role::Admin),
            ..UpdateUserRequest::default()
        })
        .await
        .unwrap();
    assert_eq!(response.user.unwrap().role, Role::Admin);
}

#[tokio::test]
async fn test_transfer_history_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tr/transfer-history"))
        .and(query_param("username", "partner_a"))
        .and(query_param("date", "2024-05-02"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transferHistory": [
                { "amount": 10, "type": "deposit", "date": "2024-05-02T10:00:00Z" }
            ]
        })))
        .mount(&server)
        .await;

    let client = Cashtree::new(CashtreeConfig::new(server.uri()));
    let history = client
        .transfer_history(Some("partner_a"), Some("2024-05-02"))
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, TransferKind::Deposit);
}
