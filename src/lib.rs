pub mod api;
pub mod config;
pub mod credentials;
pub mod db;
pub mod error;
pub mod identity;
pub mod models;
pub mod services;
pub mod state;
pub mod validation;
