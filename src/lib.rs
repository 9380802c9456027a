pub mod backend;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod models;
pub mod resource;
pub mod startup;

// Re-export commonly used types for easier access
pub use models::{Course, Subject, Teacher};
