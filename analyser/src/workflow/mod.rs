pub mod aggregate;
pub mod batch;
pub mod config;
pub mod manifest;
pub mod runner;
