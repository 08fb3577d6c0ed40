pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod format;
pub mod http;
pub mod marketplace;
pub mod output;
pub mod retry;
pub mod store;
pub mod walker;
