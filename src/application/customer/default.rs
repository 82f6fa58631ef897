use crate::application::lifecycle::Lifecycle;
use crate::application::strategy::CustomerStrategy;
use crate::domain::action::CheckoutAction;
use crate::domain::options::{CustomerCredentials, CustomerInitializeOptions};
use crate::domain::ports::CheckoutStoreRef;
use crate::domain::state::CheckoutState;
use crate::error::{NotInitializedKind, Result};
use async_trait::async_trait;

/// Email and password sign-in against the store's own customer endpoint.
pub struct DefaultCustomerStrategy {
    store: CheckoutStoreRef,
    lifecycle: Lifecycle,
}

impl DefaultCustomerStrategy {
    pub fn new(store: CheckoutStoreRef) -> Self {
        Self {
            store,
            lifecycle: Lifecycle::new(NotInitializedKind::Customer),
        }
    }
}

#[async_trait]
impl CustomerStrategy for DefaultCustomerStrategy {
    async fn initialize(&self, _options: CustomerInitializeOptions) -> Result<CheckoutState> {
        self.lifecycle.initialize(|| async { Ok(()) }).await?;
        Ok(self.store.state())
    }

    async fn deinitialize(&self) -> Result<CheckoutState> {
        self.lifecycle.deinitialize(|| async { Ok(()) }).await?;
        Ok(self.store.state())
    }

    async fn sign_in(&self, credentials: CustomerCredentials) -> Result<CheckoutState> {
        self.store
            .dispatch(CheckoutAction::SignInCustomer(credentials))
            .await
    }

    async fn sign_out(&self) -> Result<CheckoutState> {
        self.store.dispatch(CheckoutAction::SignOutCustomer).await
    }
}
