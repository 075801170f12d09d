//! DNS provider implementations.

/// Shared utilities used by provider implementations.
pub mod common;

mod cloudflare;
mod memory;

pub use cloudflare::CloudflareProvider;
pub use memory::MemoryProvider;
