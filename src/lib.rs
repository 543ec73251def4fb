pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod extractors;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod resources;
pub mod server;
pub mod state;
pub mod validation;
