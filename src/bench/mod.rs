//! Benchmark engine module
//!
//! Contains the two benchmark phases: writing the random payload and
//! measuring uncached reads against it.

pub mod generator;
pub mod payload;
pub mod runner;

// Re-export commonly used types
pub use generator::PayloadGenerator;
pub use payload::Payload;
pub use runner::BenchmarkRunner;
