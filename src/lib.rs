// src/lib.rs

//! GA4 audience builder library

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
