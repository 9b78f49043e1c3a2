//! End-to-end checks of the public storefront and sign-in flow.
//!
//! Requires a running server backed by a migrated database:
//! `cargo test -p mrshopy-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use mrshopy_integration_tests::{base_url, client, location, register, unique_email};
use reqwest::StatusCode;

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_health_endpoints() {
    let client = client().unwrap();

    let resp = client.get(format!("{}/health", base_url())).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");

    let resp = client
        .get(format!("{}/health/ready", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_shop_lists_products_anonymously() {
    let client = client().unwrap();

    let resp = client.get(format!("{}/shop", base_url())).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("<html"));
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_content_pages_are_served() {
    let client = client().unwrap();

    for slug in ["about", "faq", "contact-us", "privacy-policy", "disclaimer"] {
        let resp = client
            .get(format!("{}/{slug}", base_url()))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "/{slug}");
    }

    let resp = client
        .get(format!("{}/no-such-page", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_register_then_account_page() {
    let client = client().unwrap();
    let email = unique_email();

    let landing = register(&client, &email, "correct-horse-battery").await.unwrap();
    assert_eq!(landing, "/shop");

    let resp = client
        .get(format!("{}/account", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains(&email));
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_duplicate_registration_is_rejected() {
    let email = unique_email();

    let first = client().unwrap();
    register(&first, &email, "correct-horse-battery").await.unwrap();

    let second = client().unwrap();
    let resp = second
        .post(format!("{}/register", base_url()))
        .form(&[
            ("display_name", "Someone Else"),
            ("email", email.as_str()),
            ("password", "another-password"),
            ("password_confirm", "another-password"),
        ])
        .send()
        .await
        .unwrap();
    assert!(!resp.status().is_redirection());
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_logout_ends_session() {
    let client = client().unwrap();
    register(&client, &unique_email(), "correct-horse-battery")
        .await
        .unwrap();

    let resp = client
        .post(format!("{}/logout", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp), "/shop");

    let resp = client
        .get(format!("{}/account", base_url()))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_redirection());
    assert!(location(&resp).starts_with("/login"));
}
