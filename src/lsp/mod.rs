pub mod backend;
pub mod config;
pub mod document;
pub mod models;
pub mod requests;
