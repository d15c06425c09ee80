//! # Relic
//!
//! Relic is the asset-resolution layer of a game runtime. It turns a set of
//! on-disk archives, plus unpacked patch overlays, into strongly-typed,
//! version-decoded in-memory assets, cached by logical path and loaded safely
//! from multiple threads.
//!
//! The stack is built from four layers, leaf to root:
//!
//! - [`archive::Archive`] owns exactly one backing store (a packed read-only
//!   container, a zip container, or a plain folder) and its content index.
//! - [`archive::ArchiveManager`] merges an ordered list of archives into one
//!   addressable namespace, where archives added later override earlier ones
//!   for identical content hashes. This is how patches replace base assets
//!   without any per-file versioning.
//! - [`res::loader::ResourceLoader`] decodes raw bytes into a typed asset,
//!   dispatching on the 32-bit type tag found in a fixed binary header (or
//!   sniffed from an XML root element) to a registered, version-aware factory.
//! - [`res::ResourceManager`] is the facade: it resolves a logical identifier
//!   to a cached resource, or runs archive read + decode on a worker pool and
//!   caches the outcome, including negative ones.
//!
//! Failures below the facade are reported as absent values and logged, never
//! as panics. During active development archives are frequently incomplete;
//! a missing or malformed asset must degrade to "resource absent" so the
//! caller can fall back.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

pub mod errors;
pub mod utils;

pub mod archive;
pub mod res;
pub mod sched;

pub mod prelude;
