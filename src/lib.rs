// Public API - only expose the runner module
pub mod runner;

// Internal modules - organized by subsystem
mod config;
mod engine;
mod error;
mod jobs;
mod pipeline;
mod sql;
mod telemetry;
