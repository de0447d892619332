mod catalog;
mod exports;
mod health;
mod imports;
mod metrics;

pub use catalog::{create_user_handler, list_orders_handler, list_products_handler, list_users_handler};
pub use exports::{
    download_products_csv_handler, export_orders_csv_handler, export_orders_json_handler,
    export_products_json_handler,
};
pub use health::health_handler;
pub use imports::{import_orders_handler, import_products_handler, upload_products_csv_handler};
pub use metrics::metrics_handler;
