//! space-core: transport-independent access to a space of named files.
//!
//! This crate provides:
//! - The `Space` trait, implemented once per transport
//! - `FileMeta` / `FileData` and the conversions between content representations
//! - `ClientHooks` for restart-worthy failures
//! - `InMemorySpace`, an in-memory implementation for tests

pub mod data;
pub mod hooks;
pub mod memory;
pub mod meta;
pub mod space;

pub use data::{
    Encoding, ExtensionMimeLookup, FileContent, FileData, MimeLookup, content_type_for,
};
pub use hooks::{ClientHooks, LoggingHooks, RestartReason};
pub use memory::InMemorySpace;
pub use meta::{FileMeta, OCTET_STREAM, Permission};
pub use space::{Result, Space, SpaceError};
