use std::sync::Arc;
use crate::config::Args;
use crate::store::Store;
use crate::throttle::Throttle;
// app's shared state

pub struct AppState {
    pub store: Store,
    pub throttle: Arc<Throttle>, // shared with the sweeper task
    pub max_upload_bytes: usize, // largest accepted request body
}

impl AppState {
    pub fn new(throttle: Throttle, max_upload_bytes: usize) -> Self {
        Self {
            store: Store::new(),
            throttle: Arc::new(throttle),
            max_upload_bytes,
        }
    }

    pub fn from_args(args: &Args) -> Self {
        Self::new(
            Throttle::new(args.throttle_interval(), args.throttle_ttl()),
            args.max_upload_bytes(),
        )
    }
}
