//! # Logging
//!
//! [`setup_tracing`] installs a compact `tracing` subscriber filtered by
//! `RUST_LOG` (default `info`). Module paths are hidden; spans carry the
//! session, table and tool fields instead.
//!
//! ```bash
//! RUST_LOG=debug cargo run            # request payloads and cache hits
//! RUST_LOG=tableside::engine=trace    # one module
//! ```
//!
//! A chat turn at `info` reads roughly:
//!
//! ```text
//! INFO send{session_id="s1"}:dispatch_all{session_id="s1" calls=1}:execute{session_id="s1" tool="addToOrder"}: Added to order item_id=grilled-salmon quantity=2
//! INFO submit{restaurant_id="demo_restaurant" table_id="table_1"}: Draft submitted order_id=... total=58.98
//! ```

use tracing_subscriber::EnvFilter;

pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
