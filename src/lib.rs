//! # Tableside
//!
//! > **Conversational ordering for restaurant tables.**
//!
//! A guest talks to an assistant, by chat or by voice, and the assistant
//! builds an order on their behalf through a fixed set of tools. The draft
//! order lives in the guest's session until it is handed off to checkout.
//!
//! ## 🏗️ Design
//!
//! State lives in three resource actors built on [`actor_framework`]:
//! sessions (with their draft order), menu items and submitted orders. Each
//! runs in its own Tokio task and owns its map outright; everything else
//! talks to them through cloneable clients.
//!
//! Draft mutations are read-modify-write cycles guarded by a version check.
//! Two tool calls racing on one session never lose an update: the loser
//! re-reads and tries again.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. State ([`session_actor`], [`menu_actor`], [`order_actor`], [`clients`])
//! - **Role**: [`ActorEntity`](actor_framework::ActorEntity) implementations
//!   and the domain clients wrapping them.
//! - **Key items**: [`SessionClient`](clients::SessionClient),
//!   [`MenuClient`](clients::MenuClient), [`OrderClient`](clients::OrderClient).
//!
//! ### 2. Ordering ([`catalog`], [`engine`], [`tools`])
//! - **Role**: the cached menu, the draft mutation rules and the tool surface
//!   the assistant calls.
//! - **Key items**: [`MenuCatalog`](catalog::MenuCatalog),
//!   [`OrderEngine`](engine::OrderEngine),
//!   [`ToolDispatcher`](tools::ToolDispatcher).
//!
//! ### 3. Conversation ([`assistant`], [`conversation`])
//! - **Role**: the language model seam and the two adapters (chat and voice)
//!   that drive it.
//!
//! ### 4. Handoff ([`checkout`], [`assistance`])
//! - **Role**: turning a draft into an order; paging staff.
//!
//! ### 5. Surface ([`api`], [`runtime`], [`config`])
//! - **Role**: HTTP routes, actor startup and shutdown, environment
//!   configuration.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! GEMINI_API_KEY=... RUST_LOG=info cargo run
//! curl -X POST localhost:3000/api/seed
//! ```

pub mod api;
pub mod assistance;
pub mod assistant;
pub mod catalog;
pub mod checkout;
pub mod clients;
pub mod config;
pub mod conversation;
pub mod engine;
pub mod menu_actor;
pub mod model;
pub mod order_actor;
pub mod runtime;
pub mod session_actor;
pub mod tools;
