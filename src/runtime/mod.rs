//! Runtime orchestration.
//!
//! - [`OrderingSystem`] - starts the actors, wires the services on top of
//!   them and shuts everything down again
//! - [`setup_tracing`] - initializes logging

pub mod ordering_system;
pub mod tracing;

pub use ordering_system::*;
pub use self::tracing::*;
