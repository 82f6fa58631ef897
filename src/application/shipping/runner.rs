use crate::application::queue::{SHIPPING_STRATEGY, SerializedQueue};
use crate::application::registry::Registry;
use crate::application::strategy::ShippingStrategy;
use crate::domain::method::MethodKey;
use crate::domain::ports::CheckoutStoreRef;
use crate::domain::state::{Address, CheckoutState};
use crate::error::Result;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Routes shipping updates to the strategy matching the current payment
/// provider and serializes them on the `shippingStrategy` queue.
pub struct ShippingStrategyRunner {
    store: CheckoutStoreRef,
    registry: Arc<Registry<dyn ShippingStrategy>>,
    queue: Arc<SerializedQueue>,
}

impl ShippingStrategyRunner {
    pub fn new(
        store: CheckoutStoreRef,
        registry: Arc<Registry<dyn ShippingStrategy>>,
        queue: Arc<SerializedQueue>,
    ) -> Self {
        Self {
            store,
            registry,
            queue,
        }
    }

    /// Providers without a dedicated shipping strategy use the `default` key.
    /// An unregistered `default` is still reported as not found.
    fn resolve(&self) -> Result<Arc<dyn ShippingStrategy>> {
        let key = self
            .store
            .state()
            .payment_provider_id()
            .map(MethodKey::from)
            .filter(|key| self.registry.contains(key))
            .unwrap_or(MethodKey::Default);

        debug!(method = %key, "resolved shipping strategy");
        self.registry.get(&key)
    }

    /// Takes its place on the queue when called, not when first polled.
    pub fn update_address(
        &self,
        address: Address,
    ) -> impl Future<Output = Result<CheckoutState>> + use<> {
        let queued = self.resolve().map(|strategy| {
            self.queue
                .run(SHIPPING_STRATEGY, move || async move {
                    strategy.update_address(address).await
                })
        });
        async move { queued?.await }
    }

    pub fn select_option(
        &self,
        option_id: String,
    ) -> impl Future<Output = Result<CheckoutState>> + use<> {
        let queued = self.resolve().map(|strategy| {
            self.queue
                .run(SHIPPING_STRATEGY, move || async move {
                    strategy.select_option(&option_id).await
                })
        });
        async move { queued?.await }
    }
}
