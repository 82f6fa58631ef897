//! Strategy orchestration: the registry, the lifecycle contract, the shared
//! serialization primitives and every concrete strategy family.

pub mod checkout_button;
pub mod customer;
pub mod googlepay;
pub mod lifecycle;
pub mod payment;
pub mod queue;
pub mod registries;
pub mod registry;
pub mod shipping;
pub mod single_flight;
pub mod strategy;
