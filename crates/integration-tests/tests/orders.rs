//! Checkout through fulfilment against a live server.

#![allow(clippy::unwrap_used)]

use mrshopy_core::Price;
use mrshopy_core::order::{GIFT_WRAP_COST, order_total};
use mrshopy_integration_tests::{
    base_url, client, location, page, register, sign_in_super_admin, text_between, unique_email,
};

/// First in-stock product on the shop page.
fn in_stock_product_path(shop_html: &str) -> String {
    shop_html
        .split(r#"<a class="product-card" href=""#)
        .skip(1)
        .find(|card| !card[..card.find("</a>").unwrap()].contains("Out of stock"))
        .and_then(|card| card.split('"').next())
        .expect("the catalog has an in-stock product (run `mrshopy-cli seed`)")
        .to_owned()
}

fn rupees(display: &str) -> Price {
    display.trim_start_matches('₹').parse().unwrap()
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_order_lifecycle_from_checkout_to_completion() {
    let customer = client().unwrap();
    let email = unique_email();
    register(&customer, &email, "correct-horse-battery")
        .await
        .unwrap();

    let product_path = in_stock_product_path(&page(&customer, "/shop").await.unwrap());
    let order_path = format!("{product_path}/order");

    let checkout = page(&customer, &order_path).await.unwrap();
    let unit_price = rupees(text_between(&checkout, "Total: <strong>", "</strong>").unwrap());
    let expected_total = order_total(unit_price, true);
    assert_eq!(
        expected_total,
        unit_price + Price::from_rupees(GIFT_WRAP_COST)
    );
    assert!(checkout.contains(&format!("With gift wrap: {expected_total}")));

    let resp = customer
        .post(format!("{}{order_path}", base_url()))
        .form(&[
            ("full_name", "Asha Menon"),
            ("house_name", "Rose Villa 12"),
            ("local_area", "Kakkanad"),
            ("city", "Kochi"),
            ("state", "Kerala"),
            ("phone", "9876543210"),
            ("gift_wrap", "on"),
            ("customer_notes", "Lovely packaging please"),
        ])
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/account");

    let account = page(&customer, "/account").await.unwrap();
    assert!(account.contains("Order placed! We will contact you to confirm delivery."));
    assert!(account.contains("(gift wrapped)"));
    assert!(account.contains(&expected_total.to_string()));
    assert!(account.contains("Pending"));

    // The next checkout remembers the shipping details.
    let again = page(&customer, &order_path).await.unwrap();
    for value in ["Asha Menon", "Rose Villa 12", "Kakkanad", "Kochi", "Kerala", "9876543210"] {
        assert!(again.contains(&format!(r#"value="{value}""#)), "{value}");
    }

    let admin = client().unwrap();
    assert_eq!(
        sign_in_super_admin(&admin).await.unwrap(),
        "/admin/dashboard",
        "set SHOP_ADMIN_PASSWORD to the admin1@gmail.com password"
    );
    let orders = page(&admin, "/admin/orders").await.unwrap();
    let row = &orders[orders.find(&email).unwrap()..];
    let order_id = text_between(row, r#"href="/admin/orders/"#, "\"").unwrap();

    let resp = admin
        .post(format!("{}/admin/orders/{order_id}/complete", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp), "/admin/orders");

    let orders = page(&admin, "/admin/orders").await.unwrap();
    assert!(orders.contains("Order completed."));
    assert!(!orders.contains(&email));

    let account = page(&customer, "/account").await.unwrap();
    assert!(!account.contains(&order_id[..8]));
    assert!(account.contains("You have not placed any orders yet."));
}
