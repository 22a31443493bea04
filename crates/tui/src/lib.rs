pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod forms;
pub mod store;
pub mod ui;
pub mod views;
