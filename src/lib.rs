pub mod adapters;
pub mod aggregator;
pub mod config;
pub mod errors;
pub mod normalization;
pub mod shared_types;
pub mod snapshot_store;
pub mod spread_engine;
pub mod view;
