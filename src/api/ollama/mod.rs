pub mod client;
pub mod models;

pub use client::{model_available, OllamaClient};
