pub mod app;
pub mod cli;
pub mod collectors;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod types;
pub mod ui;
