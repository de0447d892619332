mod common;

use axum::http::{StatusCode, header};
use serde_json::{Value, json};

use common::{body_json, body_text, get, post_json, send, unthrottled_app, upload};

async fn app_with_users() -> axum::Router {
    let (app, _) = unthrottled_app();
    for username in ["alice", "bob"] {
        send(&app, post_json("/api/users", json!({ "username": username }))).await;
    }
    app
}

type ProductFields = (String, String, String, u64, bool, Option<u64>);

fn product_fields(products: &Value) -> Vec<ProductFields> {
    products
        .as_array()
        .unwrap()
        .iter()
        .map(|p| {
            (
                p["name"].as_str().unwrap().to_string(),
                p["description"].as_str().unwrap().to_string(),
                p["price"].as_str().unwrap().to_string(),
                p["discount"].as_u64().unwrap(),
                p["archived"].as_bool().unwrap(),
                p["created_by"].as_u64(),
            )
        })
        .collect()
}

#[tokio::test]
async fn products_survive_csv_export_and_import() {
    let source = app_with_users().await;
    let csv = "name,description,price,discount,archived,created_by\n\
               Pen,\"Blue, fine\",1.5,0,,\n\
               Desk,Oak,120,15,true,bob\n";
    let response = send(&source, upload("/admin/shop/products/import", "products.csv", csv)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let exported = send(&source, get("/api/products/download_csv")).await;
    assert_eq!(exported.status(), StatusCode::OK);
    assert_eq!(
        exported.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=products-export.csv"
    );
    let exported = body_text(exported).await;

    let target = app_with_users().await;
    let response = send(
        &target,
        upload("/admin/shop/products/import", "products-export.csv", &exported),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let before = body_json(send(&source, get("/api/products")).await).await;
    let after = body_json(send(&target, get("/api/products")).await).await;
    assert_eq!(product_fields(&before), product_fields(&after));
    assert_eq!(after[1]["archived"], true);
    assert_eq!(after[1]["created_by"], 2);
}

#[tokio::test]
async fn products_survive_json_export_and_import() {
    let source = app_with_users().await;
    let body = json!({
        "a": { "name": "Lamp", "price": "19.99", "discount": 5, "archived": true, "created_by": "alice" },
        "b": { "name": "Rug", "description": "Wool" }
    })
    .to_string();
    send(&source, upload("/admin/shop/products/import", "products.json", &body)).await;

    let exported = body_text(send(&source, get("/shop/products/export")).await).await;

    let target = app_with_users().await;
    let response = send(
        &target,
        upload("/admin/shop/products/import", "products.json", &exported),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let before = body_json(send(&source, get("/api/products")).await).await;
    let after = body_json(send(&target, get("/api/products")).await).await;
    assert_eq!(product_fields(&before), product_fields(&after));
    assert_eq!(after[0]["archived"], true);
    assert_eq!(after[0]["created_by"], 1);
}

async fn orders_with_names(app: &axum::Router) -> Value {
    body_json(send(app, get("/shop/orders/export")).await).await
}

#[tokio::test]
async fn orders_survive_json_and_csv_export_and_import() {
    let products = "name,price\nPen,1\nInk,2\nPaper,3\n";
    let source = app_with_users().await;
    send(&source, upload("/admin/shop/products/import", "p.csv", products)).await;
    let orders = json!({
        "x": { "user": "alice", "delivery_address": "1 Main St", "promocode": "SALE", "products": ["Pen", "Ink"] },
        "y": { "user": "bob", "delivery_address": "2 High St", "products": [] }
    })
    .to_string();
    let response = send(&source, upload("/admin/shop/orders/import", "o.json", &orders)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let expected = orders_with_names(&source).await;
    assert_eq!(expected["1"]["products"], json!(["Pen", "Ink"]));
    assert_eq!(expected["2"]["promocode"], "");

    for (uri, file_name) in [
        ("/shop/orders/export", "orders.json"),
        ("/shop/orders/export.csv", "orders.csv"),
    ] {
        let exported = body_text(send(&source, get(uri)).await).await;

        let target = app_with_users().await;
        send(&target, upload("/admin/shop/products/import", "p.csv", products)).await;
        let response = send(
            &target,
            upload("/admin/shop/orders/import", file_name, &exported),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED, "{file_name}");

        assert_eq!(orders_with_names(&target).await, expected, "{file_name}");
    }
}

#[tokio::test]
async fn metrics_are_exposed() {
    let (app, _) = unthrottled_app();
    send(&app, get("/health")).await;

    let response = send(&app, get("/metrics")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("shopsite_requests_total"));
}
