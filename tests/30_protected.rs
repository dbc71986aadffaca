mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

use emarket_api::auth::{generate_jwt, Claims, ACCESS_ADMIN, ACCESS_USER};

// Tokens minted with the same development secret the spawned server uses.
fn user_token() -> String {
    let claims = Claims::new(
        "buyer@example.com".to_string(),
        "Buyer".to_string(),
        ACCESS_USER.to_string(),
        Uuid::new_v4(),
    );
    generate_jwt(claims).expect("token")
}

fn admin_token() -> String {
    let claims = Claims::new(
        "admin@emarket.com".to_string(),
        "Admin".to_string(),
        ACCESS_ADMIN.to_string(),
        Uuid::new_v4(),
    );
    generate_jwt(claims).expect("token")
}

#[tokio::test]
async fn api_routes_require_a_bearer_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for path in ["/api/auth/whoami", "/api/cart", "/api/orders"] {
        let res = client.get(format!("{}{}", server.base_url, path)).send().await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{} without token", path);
        let body = res.json::<serde_json::Value>().await?;
        common::assert_envelope(&body, StatusCode::UNAUTHORIZED);
    }

    let res = client
        .get(format!("{}/api/auth/whoami", server.base_url))
        .header("authorization", "Bearer not.a.token")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn whoami_reflects_the_token_claims() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/auth/whoami", server.base_url))
        .bearer_auth(user_token())
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    common::assert_envelope(&body, StatusCode::OK);
    assert_eq!(body["data"]["email"], "buyer@example.com");
    assert_eq!(body["data"]["access"], "user");
    Ok(())
}

#[tokio::test]
async fn admin_routes_reject_non_admin_tokens() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/admin/dashboard", server.base_url))
        .bearer_auth(user_token())
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = res.json::<serde_json::Value>().await?;
    common::assert_envelope(&body, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied");
    Ok(())
}

#[tokio::test]
async fn cart_add_rejects_zero_quantity() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // Quantity validation runs before any database access
    let res = client
        .post(format!("{}/api/cart", server.base_url))
        .bearer_auth(user_token())
        .json(&json!({ "product_id": Uuid::new_v4(), "quantity": 0 }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Invalid quantity");
    Ok(())
}

#[tokio::test]
async fn shipment_update_rejects_unknown_status() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/admin/shipments", server.base_url))
        .bearer_auth(admin_token())
        .json(&json!({ "order_id": Uuid::new_v4(), "shipment_status": "Teleported" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    common::assert_envelope(&body, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid shipment status");
    Ok(())
}

#[tokio::test]
async fn restock_rejects_non_positive_quantity() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/admin/products/{}/restock", server.base_url, Uuid::new_v4()))
        .bearer_auth(admin_token())
        .json(&json!({ "quantity": -5 }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Invalid quantity");
    Ok(())
}
