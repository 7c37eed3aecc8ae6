// In-memory GraphStore implementations for tests
pub mod fakes;
pub mod mocks;

// Re-export commonly used test utilities
pub use fakes::*;
pub use mocks::*;
