//! In-process adapters for every port: a simulated store and page plus
//! scriptable vendor SDKs.

pub mod document;
pub mod environment;
pub mod in_memory;
pub mod sandbox;
