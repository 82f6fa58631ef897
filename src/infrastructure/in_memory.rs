use crate::config::SandboxConfig;
use crate::domain::action::CheckoutAction;
use crate::domain::ports::{CheckoutStore, FormPoster, PostRequest, RequestSender};
use crate::domain::state::{
    BillingAddress, CardInformation, Checkout, CheckoutState, Customer, PaymentMethod,
    PaymentProvider, StoreConfig,
};
use crate::error::{CheckoutError, MissingDataKind, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tracing::debug;

/// What the server holds; loads copy it into the local state.
#[derive(Debug, Clone, Default)]
struct RemoteCheckout {
    checkout: Option<Checkout>,
    config: Option<StoreConfig>,
    payment_methods: HashMap<String, PaymentMethod>,
    billing_address: Option<BillingAddress>,
    provider_id: Option<String>,
}

#[derive(Debug, Default)]
struct StoreInner {
    remote: RemoteCheckout,
    state: CheckoutState,
    actions: Vec<CheckoutAction>,
    requests: Vec<(String, PostRequest)>,
    orders: u32,
}

/// A thread-safe in-memory checkout store backed by a simulated server.
///
/// State sits behind a synchronous `RwLock` so that [`CheckoutStore::state`]
/// can be read from vendor callbacks. The lock is never held across an await.
/// The store also answers `/checkout.php` posts, recording the wallet nonce
/// and provider the way the server would.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCheckoutStore {
    inner: Arc<RwLock<StoreInner>>,
    delay: Option<Duration>,
}

impl InMemoryCheckoutStore {
    /// Creates a store with nothing loaded and nothing on the server.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the server side from `config`. Shipping address is local state.
    pub fn from_config(config: &SandboxConfig) -> Self {
        let remote = RemoteCheckout {
            checkout: config.checkout.clone(),
            config: Some(config.store.clone()),
            payment_methods: config
                .payment_methods
                .iter()
                .map(|method| (method.id.clone(), method.clone()))
                .collect(),
            billing_address: config.billing_address.clone(),
            provider_id: config.payment_provider.clone(),
        };
        let state = CheckoutState {
            shipping_address: config.shipping_address.clone(),
            ..Default::default()
        };

        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                remote,
                state,
                ..Default::default()
            })),
            delay: (config.dispatch_delay_ms > 0)
                .then(|| Duration::from_millis(config.dispatch_delay_ms)),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Actions dispatched so far, in the order they were applied.
    pub fn actions(&self) -> Vec<CheckoutAction> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .actions
            .clone()
    }

    pub fn requests(&self) -> Vec<(String, PostRequest)> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .requests
            .clone()
    }

    fn apply(inner: &mut StoreInner, action: &CheckoutAction) -> Result<()> {
        let StoreInner {
            remote,
            state,
            orders,
            ..
        } = inner;

        match action {
            CheckoutAction::LoadCurrentCheckout | CheckoutAction::LoadDefaultCheckout => {
                state.checkout = remote.checkout.clone();
                state.config = remote.config.clone();
                state.billing_address = remote.billing_address.clone();
                state.payment = remote.provider_id.clone().map(|provider_id| PaymentProvider {
                    provider_id,
                });
            }
            CheckoutAction::LoadPaymentMethod { method_id } => {
                let method = remote
                    .payment_methods
                    .get(method_id)
                    .cloned()
                    .ok_or(CheckoutError::MissingData(MissingDataKind::PaymentMethod))?;
                state.payment_methods.insert(method_id.clone(), method);
                if state.checkout.is_none() {
                    state.checkout = remote.checkout.clone();
                    state.config = remote.config.clone();
                    state.billing_address = remote.billing_address.clone();
                }
            }
            CheckoutAction::UpdateBillingAddress { id, address } => {
                let billing = BillingAddress {
                    id: id.clone(),
                    address: address.clone(),
                };
                remote.billing_address = Some(billing.clone());
                state.billing_address = Some(billing);
            }
            CheckoutAction::UpdateShippingAddress { address } => {
                state.shipping_address = Some(address.clone());
            }
            CheckoutAction::SelectShippingOption { option_id } => {
                if state.shipping_address.is_none() {
                    return Err(CheckoutError::InvalidArgument(
                        "Unable to select a shipping option without a shipping address."
                            .to_string(),
                    ));
                }
                state.shipping_option_id = Some(option_id.clone());
            }
            CheckoutAction::SignInCustomer(credentials) => {
                state.customer = Some(Customer {
                    email: credentials.email.clone(),
                });
            }
            CheckoutAction::SignOutCustomer => {
                state.customer = None;
            }
            CheckoutAction::RemoteSignOut { provider_id } => {
                if remote.provider_id.as_deref() == Some(provider_id.as_str()) {
                    remote.provider_id = None;
                }
                state.payment = None;
                state.customer = None;
            }
            CheckoutAction::SubmitOrder(_) => {
                if state.checkout.is_none() {
                    return Err(CheckoutError::MissingData(MissingDataKind::Checkout));
                }
                *orders += 1;
                state.order_id = Some(format!("order-{orders}"));
            }
            CheckoutAction::SubmitPayment(payload) => {
                if state.order_id.is_none() {
                    return Err(CheckoutError::MissingData(MissingDataKind::Payment));
                }
                state.payment = Some(PaymentProvider {
                    provider_id: payload.method_id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Mirrors the server's `set_external_checkout` handler.
    fn set_external_checkout(remote: &mut RemoteCheckout, request: &PostRequest) -> Result<()> {
        let provider = request
            .body
            .get("provider")
            .ok_or(CheckoutError::InvalidArgument("missing provider".to_string()))?;
        let card_information = request
            .body
            .get("card_information")
            .map(|raw| serde_json::from_str::<CardInformation>(raw))
            .transpose()?;

        if let Some(method) = remote.payment_methods.get_mut(provider) {
            method.initialization_data.nonce = request.body.get("nonce").cloned();
            method.initialization_data.card_information = card_information;
        }
        remote.provider_id = Some(provider.clone());
        Ok(())
    }
}

#[async_trait]
impl CheckoutStore for InMemoryCheckoutStore {
    async fn dispatch(&self, action: CheckoutAction) -> Result<CheckoutState> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        debug!(action = action.name(), "dispatching");
        Self::apply(&mut inner, &action)?;
        inner.actions.push(action);
        Ok(inner.state.clone())
    }

    fn state(&self) -> CheckoutState {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .state
            .clone()
    }
}

#[async_trait]
impl RequestSender for InMemoryCheckoutStore {
    async fn post(&self, path: &str, request: PostRequest) -> Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        debug!(path, "posting");
        if request.body.get("action").map(String::as_str) == Some("set_external_checkout") {
            Self::set_external_checkout(&mut inner.remote, &request)?;
        }
        inner.requests.push((path.to_string(), request));
        Ok(())
    }
}

/// Records full-page form posts instead of navigating.
#[derive(Debug, Clone, Default)]
pub struct RecordingFormPoster {
    posts: Arc<Mutex<Vec<(String, PostRequest)>>>,
}

impl RecordingFormPoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posts(&self) -> Vec<(String, PostRequest)> {
        self.posts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl FormPoster for RecordingFormPoster {
    fn post_form(&self, path: &str, request: PostRequest) {
        debug!(path, "submitting form");
        self.posts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((path.to_string(), request));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::options::{OrderRequestBody, PaymentInstrument, PaymentPayload};
    use crate::domain::state::Address;

    fn seeded() -> InMemoryCheckoutStore {
        InMemoryCheckoutStore::from_config(&SandboxConfig::default())
    }

    #[tokio::test]
    async fn test_load_copies_remote_checkout() {
        let store = seeded();
        assert!(store.state().checkout.is_none());

        let state = store
            .dispatch(CheckoutAction::LoadCurrentCheckout)
            .await
            .unwrap();
        assert_eq!(state.checkout.unwrap().cart.id, "cart-1");
        assert_eq!(store.actions(), vec![CheckoutAction::LoadCurrentCheckout]);
    }

    #[tokio::test]
    async fn test_unknown_payment_method_is_missing_data() {
        let store = seeded();
        let result = store
            .dispatch(CheckoutAction::LoadPaymentMethod {
                method_id: "bitcoin".to_string(),
            })
            .await;

        assert!(matches!(
            result,
            Err(CheckoutError::MissingData(MissingDataKind::PaymentMethod))
        ));
        assert!(store.actions().is_empty());
    }

    #[tokio::test]
    async fn test_external_checkout_post_stores_nonce() {
        let store = seeded();
        store
            .post(
                "/checkout.php",
                PostRequest::form_encoded()
                    .field("action", "set_external_checkout")
                    .field("provider", "googlepay")
                    .field("nonce", "nonce-1")
                    .field("card_information", r#"{"type":"VISA","number":"1111"}"#),
            )
            .await
            .unwrap();

        let state = store
            .dispatch(CheckoutAction::LoadPaymentMethod {
                method_id: "googlepay".to_string(),
            })
            .await
            .unwrap();
        let data = &state.payment_method("googlepay").unwrap().initialization_data;
        assert_eq!(data.nonce.as_deref(), Some("nonce-1"));
        assert_eq!(data.card_information.as_ref().unwrap().number, "1111");

        let state = store
            .dispatch(CheckoutAction::LoadCurrentCheckout)
            .await
            .unwrap();
        assert_eq!(state.payment_provider_id(), Some("googlepay"));
    }

    #[tokio::test]
    async fn test_submit_payment_requires_order() {
        let store = seeded();
        store
            .dispatch(CheckoutAction::LoadCurrentCheckout)
            .await
            .unwrap();

        let payment = CheckoutAction::SubmitPayment(PaymentPayload {
            method_id: "squarev2".to_string(),
            payment_data: PaymentInstrument::Nonce(crate::domain::options::NonceInstrument {
                nonce: "n".to_string(),
            }),
        });
        assert!(store.dispatch(payment.clone()).await.is_err());

        store
            .dispatch(CheckoutAction::SubmitOrder(OrderRequestBody::default()))
            .await
            .unwrap();
        let state = store.dispatch(payment).await.unwrap();
        assert_eq!(state.order_id.as_deref(), Some("order-1"));
        assert_eq!(state.payment_provider_id(), Some("squarev2"));
    }

    #[tokio::test]
    async fn test_select_option_needs_shipping_address() {
        let store = seeded();
        let select = CheckoutAction::SelectShippingOption {
            option_id: "ground".to_string(),
        };
        assert!(store.dispatch(select.clone()).await.is_err());

        store
            .dispatch(CheckoutAction::UpdateShippingAddress {
                address: Address::default(),
            })
            .await
            .unwrap();
        let state = store.dispatch(select).await.unwrap();
        assert_eq!(state.shipping_option_id.as_deref(), Some("ground"));
    }

    #[test]
    fn test_form_poster_records_posts() {
        let poster = RecordingFormPoster::new();
        poster.post_form("/checkout.php", PostRequest::form_encoded());

        let posts = poster.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].0, "/checkout.php");
    }
}
