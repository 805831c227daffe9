//! Room reservation service: admission rules, stores and the HTTP API.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod routes;
pub mod services;
pub mod store;
pub mod validation;
