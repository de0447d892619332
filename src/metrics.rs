use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Gauge, Histogram, register_counter, register_counter_vec, register_gauge,
    register_histogram,
};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("shopsite_requests_total", "Total number of requests").unwrap();
    pub static ref THROTTLED_TOTAL: Counter =
        register_counter!("shopsite_throttled_total", "Requests rejected by the throttle").unwrap();
    pub static ref THROTTLE_ENTRIES: Gauge =
        register_gauge!("shopsite_throttle_entries", "Client addresses tracked by the throttle").unwrap();
    pub static ref IMPORTED_TOTAL: CounterVec = register_counter_vec!(
        "shopsite_imported_total",
        "Entities created by bulk import",
        &["target", "format"]
    )
    .unwrap();
    pub static ref IMPORT_FAILURES: Counter =
        register_counter!("shopsite_import_failures_total", "Bulk imports that failed").unwrap();
    pub static ref IMPORT_LATENCY: Histogram = register_histogram!(
        "shopsite_import_latency_seconds",
        "Bulk import latency in seconds"
    )
    .unwrap();
}
