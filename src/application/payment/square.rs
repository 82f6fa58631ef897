use crate::application::lifecycle::Lifecycle;
use crate::application::queue::{SerializedQueue, WIDGET_INTERACTION};
use crate::application::single_flight::DeferredRequest;
use crate::application::strategy::PaymentStrategy;
use crate::domain::action::CheckoutAction;
use crate::domain::options::{
    NonceInstrument, OrderPaymentRequestBody, OrderRequestBody, PaymentInitializeOptions,
    PaymentInstrument, PaymentPayload,
};
use crate::domain::ports::{CheckoutStoreRef, PostRequest, RequestSenderRef};
use crate::domain::state::CheckoutState;
use crate::domain::vendor::{
    CardData, CardNonceResponse, DigitalWalletType, SquareForm, SquareFormCallbacks,
    SquareFormOptions, SquarePaymentRequest, SquarePaymentTotal, SquareScriptLoader,
    SquareValidationErrors,
};
use crate::error::{CheckoutError, MissingDataKind, NotInitializedKind, Result, VendorError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use tracing::{debug, info, warn};

/// Card payments through Square's hosted form.
///
/// The form reports everything through callbacks. Form readiness and each
/// card nonce are awaited through a [`DeferredRequest`], so a second
/// `execute` while a nonce is outstanding supersedes the first.
pub struct SquarePaymentStrategy {
    store: CheckoutStoreRef,
    request_sender: RequestSenderRef,
    script_loader: Arc<dyn SquareScriptLoader>,
    queue: Arc<SerializedQueue>,
    lifecycle: Lifecycle,
    form_loaded: DeferredRequest<()>,
    nonce_request: DeferredRequest<NonceInstrument>,
    form: Mutex<Option<Arc<dyn SquareForm>>>,
    callbacks: Mutex<Option<Arc<SquareCallbackBridge>>>,
}

impl SquarePaymentStrategy {
    pub fn new(
        store: CheckoutStoreRef,
        request_sender: RequestSenderRef,
        script_loader: Arc<dyn SquareScriptLoader>,
        queue: Arc<SerializedQueue>,
    ) -> Self {
        Self {
            store,
            request_sender,
            script_loader,
            queue,
            lifecycle: Lifecycle::new(NotInitializedKind::Payment),
            form_loaded: DeferredRequest::new("paymentFormLoaded"),
            nonce_request: DeferredRequest::new("cardNonceResponseReceived"),
            form: Mutex::new(None),
            callbacks: Mutex::new(None),
        }
    }

    async fn payment_data(&self, payment: &OrderPaymentRequestBody) -> Result<NonceInstrument> {
        if let Some(PaymentInstrument::Nonce(instrument)) = &payment.payment_data {
            return Ok(instrument.clone());
        }

        let form = self
            .form
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(CheckoutError::NotInitialized(NotInitializedKind::Payment))?;

        let pending = self.nonce_request.begin();
        form.request_card_nonce();
        pending.await
    }
}

#[async_trait]
impl PaymentStrategy for SquarePaymentStrategy {
    async fn initialize(&self, options: PaymentInitializeOptions) -> Result<CheckoutState> {
        self.lifecycle
            .initialize(|| async {
                let method_id = options
                    .method_id
                    .clone()
                    .ok_or(CheckoutError::missing_option("methodId"))?;
                let square = options.square.clone().ok_or_else(|| {
                    CheckoutError::InvalidArgument(
                        "Unable to proceed because \"options.square\" argument is not provided."
                            .to_string(),
                    )
                })?;
                let mut state = self.store.state();
                if state.payment_method(&method_id).is_none() {
                    state = self
                        .store
                        .dispatch(CheckoutAction::LoadPaymentMethod {
                            method_id: method_id.clone(),
                        })
                        .await?;
                }
                let payment_method = state
                    .payment_method(&method_id)
                    .cloned()
                    .ok_or(CheckoutError::MissingData(MissingDataKind::PaymentMethod))?;

                let create_form = self.script_loader.load().await?;

                let bridge = BridgeGuard::new(SquareCallbackBridge {
                    active: AtomicBool::new(true),
                    method_id: method_id.clone(),
                    store: self.store.clone(),
                    request_sender: self.request_sender.clone(),
                    queue: self.queue.clone(),
                    form_loaded: self.form_loaded.clone(),
                    nonce_request: self.nonce_request.clone(),
                    form: OnceLock::new(),
                });

                let loaded = self.form_loaded.begin();
                let form = create_form.create(SquareFormOptions {
                    card_number: square.card_number.element_id,
                    cvv: square.cvv.element_id,
                    expiration_date: square.expiration_date.element_id,
                    postal_code: square.postal_code.element_id,
                    input_class: square.input_class,
                    application_id: payment_method.initialization_data.client_token,
                    callbacks: bridge.bridge.clone(),
                });
                let _ = bridge.bridge.form.set(Arc::downgrade(&form));
                form.build();
                loaded.await?;

                let bridge = bridge.disarm();
                info!(method_id = %method_id, "Square payment form loaded");
                *self.form.lock().unwrap_or_else(|e| e.into_inner()) = Some(form);
                *self.callbacks.lock().unwrap_or_else(|e| e.into_inner()) = Some(bridge);
                Ok(())
            })
            .await?;

        Ok(self.store.state())
    }

    async fn deinitialize(&self) -> Result<CheckoutState> {
        self.lifecycle
            .deinitialize(|| async {
                let bridge = self.callbacks.lock().unwrap_or_else(|e| e.into_inner()).take();
                if let Some(bridge) = bridge {
                    bridge.deactivate();
                }
                self.form.lock().unwrap_or_else(|e| e.into_inner()).take();
                self.nonce_request.cancel();
                self.form_loaded.cancel();
                Ok(())
            })
            .await?;

        Ok(self.store.state())
    }

    async fn execute(&self, payload: OrderRequestBody) -> Result<CheckoutState> {
        let payment = payload
            .payment
            .clone()
            .filter(|payment| payment.method_id.is_some())
            .ok_or(CheckoutError::MissingData(MissingDataKind::PaymentMethod))?;
        let method_id = payment.method_id.clone().unwrap_or_default();

        let instrument = self.payment_data(&payment).await?;

        self.store
            .dispatch(CheckoutAction::SubmitOrder(payload))
            .await?;
        self.store
            .dispatch(CheckoutAction::SubmitPayment(PaymentPayload {
                method_id,
                payment_data: PaymentInstrument::Nonce(instrument),
            }))
            .await
    }
}

/// Receives the hosted form's callbacks on the strategy's behalf.
///
/// Deactivated on teardown so late callbacks are dropped instead of settling
/// requests that belong to a later form.
struct SquareCallbackBridge {
    active: AtomicBool,
    method_id: String,
    store: CheckoutStoreRef,
    request_sender: RequestSenderRef,
    queue: Arc<SerializedQueue>,
    form_loaded: DeferredRequest<()>,
    nonce_request: DeferredRequest<NonceInstrument>,
    form: OnceLock<Weak<dyn SquareForm>>,
}

/// Deactivates a bridge whose form never finished loading, including when
/// the setup holding it is dropped by a concurrent teardown.
struct BridgeGuard {
    bridge: Arc<SquareCallbackBridge>,
    armed: bool,
}

impl BridgeGuard {
    fn new(bridge: SquareCallbackBridge) -> Self {
        Self {
            bridge: Arc::new(bridge),
            armed: true,
        }
    }

    fn disarm(mut self) -> Arc<SquareCallbackBridge> {
        self.armed = false;
        self.bridge.clone()
    }
}

impl Drop for BridgeGuard {
    fn drop(&mut self) {
        if self.armed {
            self.bridge.deactivate();
        }
    }
}

impl SquareCallbackBridge {
    fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }

    fn is_active(&self, callback: &'static str) -> bool {
        let active = self.active.load(Ordering::Acquire);
        if !active {
            debug!(callback, "dropping Square callback after teardown");
        }
        active
    }

    async fn set_external_checkout_data(&self, card_data: &CardData, nonce: Option<String>) -> Result<()> {
        self.request_sender
            .post(
                "/checkout.php",
                PostRequest::form_encoded()
                    .field("nonce", nonce.unwrap_or_default())
                    .field("provider", "squarev2")
                    .field("action", "set_external_checkout")
                    .field("cardData", serde_json::to_string(card_data)?),
            )
            .await
    }

    async fn payment_instrument_selected(&self) -> Result<()> {
        let store = self.store.clone();
        let method_id = self.method_id.clone();

        self.queue
            .run(WIDGET_INTERACTION, move || async move {
                tokio::try_join!(
                    store.dispatch(CheckoutAction::LoadCurrentCheckout),
                    store.dispatch(CheckoutAction::LoadPaymentMethod { method_id }),
                )?;
                Ok(())
            })
            .await
    }
}

#[async_trait]
impl SquareFormCallbacks for SquareCallbackBridge {
    fn payment_form_loaded(&self) {
        if !self.is_active("paymentFormLoaded") {
            return;
        }
        if let Err(error) = self.form_loaded.resolve(()) {
            warn!(%error, "Square reported a loaded form twice");
        }

        let postal_code = self
            .store
            .state()
            .billing_address
            .map(|billing| billing.address.postal_code)
            .filter(|code| !code.is_empty());
        let form = self.form.get().and_then(Weak::upgrade);
        if let (Some(postal_code), Some(form)) = (postal_code, form) {
            form.set_postal_code(&postal_code);
        }
    }

    fn unsupported_browser_detected(&self) {
        if !self.is_active("unsupportedBrowserDetected") {
            return;
        }
        if let Err(error) = self.form_loaded.reject(VendorError::UnsupportedBrowser.into()) {
            warn!(%error, "Square reported an unsupported browser outside form setup");
        }
    }

    async fn card_nonce_response_received(&self, response: CardNonceResponse) -> Result<()> {
        if !self.is_active("cardNonceResponseReceived") {
            return Ok(());
        }

        if let Some(card_data) = response
            .card_data
            .as_ref()
            .filter(|card| card.digital_wallet_type != DigitalWalletType::None)
        {
            debug!(wallet = ?card_data.digital_wallet_type, "Square digital wallet selected");
            self.set_external_checkout_data(card_data, response.nonce.clone())
                .await?;
            return self.payment_instrument_selected().await;
        }

        match (response.errors, response.nonce) {
            (Some(errors), _) if !errors.is_empty() => {
                let message = errors
                    .iter()
                    .map(|error| error.message.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                self.nonce_request
                    .reject(VendorError::NonceGeneration(message).into())
            }
            (_, Some(nonce)) => self.nonce_request.resolve(NonceInstrument { nonce }),
            _ => self.nonce_request.reject(
                VendorError::NonceGeneration("no nonce was returned".to_string()).into(),
            ),
        }
    }

    fn create_payment_request(&self) -> Result<SquarePaymentRequest> {
        let state = self.store.state();
        let checkout = state
            .checkout
            .ok_or(CheckoutError::MissingData(MissingDataKind::Checkout))?;
        let config = state
            .config
            .ok_or(CheckoutError::MissingData(MissingDataKind::CheckoutConfig))?;

        Ok(SquarePaymentRequest {
            request_shipping_address: true,
            request_billing_info: true,
            currency_code: config.currency_code,
            country_code: "US".to_string(),
            total: SquarePaymentTotal {
                label: config.store_name,
                amount: checkout.subtotal.to_string(),
                pending: false,
            },
        })
    }

    fn validate_shipping_contact(&self, errors: &SquareValidationErrors) -> Result<()> {
        if errors.is_empty() {
            return Ok(());
        }

        let message = errors
            .values()
            .map(|messages| messages.join(", "))
            .collect::<Vec<_>>()
            .join(", ");
        Err(CheckoutError::InvalidArgument(message))
    }
}
