//! Data types shared by the actors, the ordering engine and the HTTP layer.
//!
//! JSON field names are camelCase on every external surface.

pub mod draft;
pub mod menu;
pub mod order;
pub mod session;

pub use draft::*;
pub use menu::*;
pub use order::*;
pub use session::*;
