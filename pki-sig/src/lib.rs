#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

//! `pki-sig` converts ECDSA signatures between the ASN.1 DER encoding used by general-purpose
//! crypto libraries and the fixed-width raw `r || s` form expected by cryptographic tokens.
//!
//! The converters in [`signature`] work on caller-provided buffers, never allocate and keep no
//! state. Foreign-language bindings are generated with `UniFFI`.

/// DER and raw signature conversion.
pub mod signature;

/// Process-wide configuration of the foreign-facing API.
pub mod config;

/// Logging that can be forwarded to foreign language bindings.
pub mod logger;

uniffi::setup_scaffolding!("pki_sig");
