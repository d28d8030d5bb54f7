//! # Observability
//!
//! Every actor and client logs through `tracing` with structured fields (`entity_type`,
//! `id`, `size`, `error`). [`setup_tracing`] installs the subscriber once per process.
//!
//! ```bash
//! RUST_LOG=info cargo run      # Compact logs
//! RUST_LOG=debug cargo run     # Full payloads, one line per request
//! ```

/// Installs a compact `tracing-subscriber` formatter filtered by `RUST_LOG`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // entity_type already names the source
        .compact()
        .init();
}
