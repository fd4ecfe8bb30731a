// storage/src/lib.rs

//! Storage seams for the dispatch admin service.
//!
//! The production deployment sits on a managed document database and a blob
//! store; this crate defines both seams as traits and ships two
//! implementations of each: a sled-backed engine for real deployments and an
//! in-memory engine used by tests and local runs.

pub mod document_store;
pub mod memory_store;
pub mod object_store;
pub mod sled_store;

pub use document_store::{
    ChangeEvent, DocumentStore, OrderBy, Subscription,
};
pub use memory_store::{InMemoryStore, MemoryObjectStore};
pub use object_store::{FsObjectStore, ObjectRef, ObjectStore};
pub use sled_store::SledStore;
