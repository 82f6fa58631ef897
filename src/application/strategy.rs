//! The lifecycle contracts each strategy family implements.
//!
//! `initialize` is idempotent and validates its options before doing any
//! vendor work; `deinitialize` is a no-op when nothing is initialized. Every
//! other operation that relies on vendor state fails with `NotInitialized`
//! until `initialize` has succeeded.

use crate::domain::options::{
    CheckoutButtonInitializeOptions, CustomerCredentials, CustomerInitializeOptions,
    OrderRequestBody, PaymentInitializeOptions, ShippingInitializeOptions,
};
use crate::domain::state::{Address, CheckoutState};
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;

#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    async fn initialize(&self, options: PaymentInitializeOptions) -> Result<CheckoutState>;
    async fn deinitialize(&self) -> Result<CheckoutState>;
    async fn execute(&self, payload: OrderRequestBody) -> Result<CheckoutState>;

    async fn finalize(&self) -> Result<CheckoutState> {
        Err(CheckoutError::OrderFinalizationNotRequired)
    }
}

#[async_trait]
pub trait CustomerStrategy: Send + Sync {
    async fn initialize(&self, options: CustomerInitializeOptions) -> Result<CheckoutState>;
    async fn deinitialize(&self) -> Result<CheckoutState>;
    async fn sign_in(&self, credentials: CustomerCredentials) -> Result<CheckoutState>;
    async fn sign_out(&self) -> Result<CheckoutState>;
}

#[async_trait]
pub trait ShippingStrategy: Send + Sync {
    async fn initialize(&self, options: ShippingInitializeOptions) -> Result<CheckoutState>;
    async fn deinitialize(&self) -> Result<CheckoutState>;
    async fn update_address(&self, address: Address) -> Result<CheckoutState>;
    async fn select_option(&self, option_id: &str) -> Result<CheckoutState>;
}

/// Buttons may be bound to several containers at once; each container id
/// has its own initialized state.
#[async_trait]
pub trait CheckoutButtonStrategy: Send + Sync {
    async fn initialize(&self, options: CheckoutButtonInitializeOptions) -> Result<()>;
    /// Releases `container_id`, or every bound container when `None`.
    async fn deinitialize(&self, container_id: Option<&str>) -> Result<()>;
}
