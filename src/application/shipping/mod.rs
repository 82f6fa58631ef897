//! Shipping strategies and the queue-serialized runner that dispatches to them.

mod consignment;
mod runner;

pub use consignment::ConsignmentShippingStrategy;
pub use runner::ShippingStrategyRunner;
