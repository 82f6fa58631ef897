use crate::application::shipping::ShippingStrategyRunner;
use crate::domain::action::CheckoutAction;
use crate::domain::ports::{CheckoutStoreRef, PostRequest, RequestSenderRef, WalletButton};
use crate::domain::state::{Address, CheckoutState};
use crate::domain::vendor::{
    GooglePayAddress, GooglePayClient, GooglePayEnvironment, GooglePayInitializer,
    GooglePayPaymentDataRequest, GooglePayScriptLoader, GooglePaymentData, TokenizePayload,
};
use crate::error::{CheckoutError, MissingDataKind, NotInitializedKind, Result, VendorError};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

struct WalletSession {
    client: Arc<dyn GooglePayClient>,
    request: GooglePayPaymentDataRequest,
}

/// Shared Google Pay wallet plumbing used by the payment, customer and button
/// strategies.
///
/// The processor itself is not lifecycle-gated; the strategy that owns it
/// decides when to call [`initialize`](Self::initialize) and
/// [`deinitialize`](Self::deinitialize).
pub struct GooglePayProcessor {
    store: CheckoutStoreRef,
    script_loader: Arc<dyn GooglePayScriptLoader>,
    initializer: Arc<dyn GooglePayInitializer>,
    request_sender: RequestSenderRef,
    shipping: Arc<ShippingStrategyRunner>,
    method_id: Mutex<Option<String>>,
    session: Mutex<Option<Arc<WalletSession>>>,
}

impl GooglePayProcessor {
    pub fn new(
        store: CheckoutStoreRef,
        script_loader: Arc<dyn GooglePayScriptLoader>,
        initializer: Arc<dyn GooglePayInitializer>,
        request_sender: RequestSenderRef,
        shipping: Arc<ShippingStrategyRunner>,
    ) -> Self {
        Self {
            store,
            script_loader,
            initializer,
            request_sender,
            shipping,
            method_id: Mutex::new(None),
            session: Mutex::new(None),
        }
    }

    /// Loads the payment method, the SDK and the payment-data request.
    pub async fn initialize(&self, method_id: &str) -> Result<()> {
        let state = self
            .store
            .dispatch(CheckoutAction::LoadPaymentMethod {
                method_id: method_id.to_string(),
            })
            .await?;

        let payment_method = state
            .payment_method(method_id)
            .ok_or(CheckoutError::MissingData(MissingDataKind::PaymentMethod))?;
        let checkout = state
            .checkout
            .as_ref()
            .ok_or(CheckoutError::MissingData(MissingDataKind::Checkout))?;

        let environment = if payment_method.config.test_mode {
            GooglePayEnvironment::Test
        } else {
            GooglePayEnvironment::Production
        };

        let (client, request) = tokio::try_join!(
            self.script_loader.load(environment),
            self.initializer
                .initialize(checkout, payment_method, state.has_shipping_address()),
        )?;

        info!(method_id, ?environment, "configured Google Pay wallet");
        *self.session.lock().unwrap_or_else(|e| e.into_inner()) =
            Some(Arc::new(WalletSession { client, request }));
        *self.method_id.lock().unwrap_or_else(|e| e.into_inner()) = Some(method_id.to_string());
        Ok(())
    }

    pub async fn deinitialize(&self) -> Result<()> {
        self.session.lock().unwrap_or_else(|e| e.into_inner()).take();
        self.method_id.lock().unwrap_or_else(|e| e.into_inner()).take();
        self.initializer.teardown().await
    }

    pub fn method_id(&self) -> Option<String> {
        self.method_id.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn session(&self) -> Result<Arc<WalletSession>> {
        self.session
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(CheckoutError::NotInitialized(NotInitializedKind::Payment))
    }

    pub fn create_button(&self) -> Result<WalletButton> {
        Ok(self.session()?.client.create_button())
    }

    /// Opens the wallet sheet once the client reports it can pay.
    pub async fn display_wallet(&self) -> Result<GooglePaymentData> {
        let session = self.session()?;

        let ready = session
            .client
            .is_ready_to_pay(&session.request.allowed_payment_methods)
            .await?;
        if !ready {
            return Err(VendorError::WalletUnavailable.into());
        }

        session.client.load_payment_data(&session.request).await
    }

    /// Tokenizes the wallet response and hands the nonce to the server.
    pub async fn handle_success(&self, payment_data: &GooglePaymentData) -> Result<()> {
        let payload = self.initializer.parse_response(payment_data).await?;
        self.post_external_checkout(payload).await
    }

    pub async fn update_billing_address(
        &self,
        billing_address: &GooglePayAddress,
    ) -> Result<CheckoutState> {
        if self.method_id().is_none() {
            return Err(CheckoutError::Synchronization);
        }

        let remote = self
            .store
            .state()
            .billing_address
            .ok_or(CheckoutError::MissingData(MissingDataKind::BillingAddress))?;

        self.store
            .dispatch(CheckoutAction::UpdateBillingAddress {
                id: remote.id,
                address: Address::from(billing_address),
            })
            .await
    }

    pub async fn update_shipping_address(
        &self,
        shipping_address: &GooglePayAddress,
    ) -> Result<CheckoutState> {
        if self.method_id().is_none() {
            return Err(CheckoutError::Synchronization);
        }

        self.shipping
            .update_address(Address::from(shipping_address))
            .await
    }

    async fn post_external_checkout(&self, payload: TokenizePayload) -> Result<()> {
        let provider = self.method_id().ok_or(CheckoutError::Synchronization)?;
        let card_information = serde_json::json!({
            "type": payload.details.card_type,
            "number": payload.details.last_four,
        });

        debug!(provider = %provider, "posting external checkout data");
        self.request_sender
            .post(
                "/checkout.php",
                PostRequest::form_encoded()
                    .field("payment_type", payload.r#type)
                    .field("nonce", payload.nonce)
                    .field("provider", provider)
                    .field("action", "set_external_checkout")
                    .field("card_information", card_information.to_string()),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SandboxConfig;
    use crate::domain::ports::CheckoutStore;
    use crate::infrastructure::environment::SandboxEnvironment;

    fn processor(env: &SandboxEnvironment) -> GooglePayProcessor {
        let collaborators = env.collaborators();
        let registries = env.registries().unwrap();
        GooglePayProcessor::new(
            collaborators.store,
            collaborators.google_pay_loader,
            collaborators.google_pay_initializer,
            collaborators.request_sender,
            registries.shipping_runner,
        )
    }

    #[tokio::test]
    async fn test_address_updates_require_method() {
        let env = SandboxEnvironment::new(&SandboxConfig::default());
        let processor = processor(&env);
        let address = GooglePayAddress {
            postal_code: "10001".to_string(),
            ..Default::default()
        };

        let error = processor.update_shipping_address(&address).await.unwrap_err();
        assert!(matches!(error, CheckoutError::Synchronization));
        let error = processor.update_billing_address(&address).await.unwrap_err();
        assert!(matches!(error, CheckoutError::Synchronization));
        assert!(env.store.actions().is_empty());

        processor.initialize("googlepay").await.unwrap();
        let state = processor.update_shipping_address(&address).await.unwrap();
        assert_eq!(state.shipping_address.unwrap().postal_code, "10001");
        assert!(env.store.state().shipping_address.is_some());
    }
}
