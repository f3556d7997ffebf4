pub mod app;
pub mod catalog;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod output;
pub mod store;
