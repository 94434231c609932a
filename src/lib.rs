pub mod cache;
pub mod commands;
pub mod config;
pub mod db;
pub mod diff;
pub mod engine;
pub mod error;
pub mod grants;
pub mod models;
pub mod notify;
pub mod platform;
pub mod resolver;
pub mod worker;
