//! Role gating of the /admin and /staff panels against a live server.

#![allow(clippy::unwrap_used)]

use mrshopy_integration_tests::{base_url, client, location, register, unique_email};

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_anonymous_visitors_are_sent_to_shop() {
    let client = client().unwrap();

    for path in ["/admin/dashboard", "/admin/orders", "/staff/products"] {
        let resp = client
            .get(format!("{}{path}", base_url()))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_redirection(), "{path}");
        assert_eq!(location(&resp), "/shop", "{path}");
    }
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_customers_cannot_reach_panels() {
    let client = client().unwrap();
    register(&client, &unique_email(), "correct-horse-battery")
        .await
        .unwrap();

    for path in ["/admin/dashboard", "/admin/users", "/staff/products"] {
        let resp = client
            .get(format!("{}{path}", base_url()))
            .send()
            .await
            .unwrap();
        assert_eq!(location(&resp), "/shop", "{path}");
    }
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_admin_live_feed_requires_sign_in() {
    let client = client().unwrap();

    let resp = client
        .get(format!("{}/live/orders", base_url()))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_client_error() || resp.status().is_redirection());
}
