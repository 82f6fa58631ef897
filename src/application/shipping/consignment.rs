use crate::application::lifecycle::Lifecycle;
use crate::application::strategy::ShippingStrategy;
use crate::domain::action::CheckoutAction;
use crate::domain::method::MethodKey;
use crate::domain::options::ShippingInitializeOptions;
use crate::domain::ports::CheckoutStoreRef;
use crate::domain::state::{Address, CheckoutState};
use crate::error::{NotInitializedKind, Result};
use async_trait::async_trait;
use tracing::debug;

/// Updates consignments straight through the store.
///
/// Serves both the `default` key and wallet providers (such as
/// `googlepaybraintree`) whose shipping data arrives already collected.
/// Address and option updates need no vendor state, so they are not gated on
/// `initialize`.
pub struct ConsignmentShippingStrategy {
    method: MethodKey,
    store: CheckoutStoreRef,
    lifecycle: Lifecycle,
}

impl ConsignmentShippingStrategy {
    pub fn new(method: MethodKey, store: CheckoutStoreRef) -> Self {
        Self {
            method,
            store,
            lifecycle: Lifecycle::new(NotInitializedKind::Shipping),
        }
    }
}

#[async_trait]
impl ShippingStrategy for ConsignmentShippingStrategy {
    async fn initialize(&self, _options: ShippingInitializeOptions) -> Result<CheckoutState> {
        self.lifecycle.initialize(|| async { Ok(()) }).await?;
        Ok(self.store.state())
    }

    async fn deinitialize(&self) -> Result<CheckoutState> {
        self.lifecycle.deinitialize(|| async { Ok(()) }).await?;
        Ok(self.store.state())
    }

    async fn update_address(&self, address: Address) -> Result<CheckoutState> {
        debug!(method = %self.method, "updating shipping address");
        self.store
            .dispatch(CheckoutAction::UpdateShippingAddress { address })
            .await
    }

    async fn select_option(&self, option_id: &str) -> Result<CheckoutState> {
        debug!(method = %self.method, option_id, "selecting shipping option");
        self.store
            .dispatch(CheckoutAction::SelectShippingOption {
                option_id: option_id.to_string(),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SandboxConfig;
    use crate::infrastructure::in_memory::InMemoryCheckoutStore;
    use std::sync::Arc;

    fn strategy() -> (ConsignmentShippingStrategy, Arc<InMemoryCheckoutStore>) {
        let store = Arc::new(InMemoryCheckoutStore::from_config(&SandboxConfig::default()));
        (
            ConsignmentShippingStrategy::new(MethodKey::Default, store.clone()),
            store,
        )
    }

    #[tokio::test]
    async fn test_updates_do_not_require_initialize() {
        let (strategy, store) = strategy();
        let address = Address {
            city: "Austin".to_string(),
            ..Default::default()
        };

        strategy.update_address(address.clone()).await.unwrap();
        let state = strategy.select_option("ground").await.unwrap();

        assert_eq!(state.shipping_address, Some(address));
        assert_eq!(state.shipping_option_id.as_deref(), Some("ground"));
        assert_eq!(store.actions().len(), 2);
    }

    #[tokio::test]
    async fn test_initialize_and_deinitialize_touch_nothing() {
        let (strategy, store) = strategy();

        strategy.initialize(ShippingInitializeOptions::default()).await.unwrap();
        strategy.initialize(ShippingInitializeOptions::default()).await.unwrap();
        strategy.deinitialize().await.unwrap();

        assert!(store.actions().is_empty());
        assert!(strategy.lifecycle.ensure_initialized().is_err());
    }
}
