pub mod backoff;
pub mod config;
pub mod model;
pub mod purge;
pub mod store;
