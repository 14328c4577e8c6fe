pub mod access;
pub mod config;
pub mod content;
pub mod copy_config;
pub mod errors;
pub mod init;
pub mod logging;
pub mod orchestrator;
pub mod provider;
pub mod request;
pub mod store;
pub mod ui;
