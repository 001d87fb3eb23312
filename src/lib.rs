pub mod config;
pub mod error;
pub mod matching;
pub mod seed;
pub mod telemetry;
