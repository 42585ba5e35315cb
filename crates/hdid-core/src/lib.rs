//! hdid Core: address resolution, content digests, errors, and the local
//! configuration store shared by every hdid crate.

pub mod address;
pub mod config;
pub mod digest;
pub mod error;

pub use address::{AccountTriple, CanonicalAddress, Identifier};
pub use config::{CliConfig, NetworkName};
pub use digest::ContentDigest;
pub use error::CoreError;
