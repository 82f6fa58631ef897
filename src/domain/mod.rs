//! Domain types and the collaborator contracts strategies are built against.

pub mod action;
pub mod method;
pub mod options;
pub mod ports;
pub mod state;
pub mod vendor;
