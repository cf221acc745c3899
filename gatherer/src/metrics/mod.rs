pub mod accumulator;
pub mod flatten;
pub mod response;

// Re-export the main types for easy access
pub use accumulator::*;
pub use flatten::flatten;
pub use response::*;
