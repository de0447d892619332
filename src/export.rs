//! Exports shaped exactly like the files the importer reads.

use csv::WriterBuilder;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::models::{Order, Price, Product};
use crate::store::Snapshot;

pub const PRODUCT_CSV_HEADER: [&str; 6] = ["name", "description", "price", "discount", "archived", "created_by"];
pub const ORDER_CSV_HEADER: [&str; 4] = ["user", "delivery_address", "promocode", "products"];

#[derive(Serialize)]
struct ProductRow<'a> {
    name: &'a str,
    description: &'a str,
    price: Price,
    discount: u16,
    archived: bool,
    created_by: &'a str,
}

#[derive(Serialize)]
struct OrderRow<'a> {
    user: &'a str,
    delivery_address: &'a str,
    promocode: &'a str,
    products: String,
}

fn username<'a>(snapshot: &'a Snapshot, order: &Order) -> &'a str {
    snapshot
        .users
        .get(&order.user_id)
        .map(|u| u.username.as_str())
        .unwrap_or_default()
}

// Empty when the product has no creator
fn creator<'a>(snapshot: &'a Snapshot, product: &Product) -> &'a str {
    product
        .created_by
        .and_then(|id| snapshot.users.get(&id))
        .map(|u| u.username.as_str())
        .unwrap_or_default()
}

fn product_names(snapshot: &Snapshot, order: &Order) -> Vec<String> {
    order
        .products
        .iter()
        .filter_map(|id| snapshot.products.get(id))
        .map(|p| p.name.clone())
        .collect()
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, csv::Error> {
    writer.into_inner().map_err(|e| e.into_error().into())
}

pub fn products_csv(snapshot: &Snapshot) -> Result<Vec<u8>, csv::Error> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record(PRODUCT_CSV_HEADER)?;

    for product in snapshot.products.values() {
        writer.serialize(ProductRow {
            name: &product.name,
            description: &product.description,
            price: product.price,
            discount: product.discount,
            archived: product.archived,
            created_by: creator(snapshot, product),
        })?;
    }

    finish_csv(writer)
}

pub fn products_json(snapshot: &Snapshot) -> Value {
    let records: Map<String, Value> = snapshot
        .products
        .values()
        .map(|p| {
            (
                p.id.to_string(),
                json!({
                    "name": p.name,
                    "description": p.description,
                    "price": p.price,
                    "discount": p.discount,
                    "archived": p.archived,
                    "created_by": creator(snapshot, p),
                }),
            )
        })
        .collect();

    Value::Object(records)
}

pub fn orders_csv(snapshot: &Snapshot) -> Result<Vec<u8>, csv::Error> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record(ORDER_CSV_HEADER)?;

    for order in snapshot.orders.values() {
        writer.serialize(OrderRow {
            user: username(snapshot, order),
            delivery_address: &order.delivery_address,
            promocode: &order.promocode,
            products: product_names(snapshot, order).join(","),
        })?;
    }

    finish_csv(writer)
}

pub fn orders_json(snapshot: &Snapshot) -> Value {
    let records: Map<String, Value> = snapshot
        .orders
        .values()
        .map(|order| {
            (
                order.id.to_string(),
                json!({
                    "user": username(snapshot, order),
                    "delivery_address": order.delivery_address,
                    "promocode": order.promocode,
                    "products": product_names(snapshot, order),
                }),
            )
        })
        .collect();

    Value::Object(records)
}
