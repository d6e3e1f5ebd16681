//! Domain clients wrapping [`ResourceClient`](actor_framework::ResourceClient).
//!
//! Each client exposes the operations its callers need in domain terms and
//! maps [`FrameworkError`](actor_framework::FrameworkError) into the actor's
//! own error enum. Shared `get`/`delete` come from
//! [`ActorClient`](actor_framework::ActorClient).

pub mod menu_client;
pub mod order_client;
pub mod session_client;

pub use menu_client::*;
pub use order_client::*;
pub use session_client::*;
