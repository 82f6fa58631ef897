use crate::application::googlepay::GooglePayProcessor;
use crate::application::lifecycle::Lifecycle;
use crate::application::queue::{SerializedQueue, WIDGET_INTERACTION};
use crate::application::strategy::PaymentStrategy;
use crate::domain::action::CheckoutAction;
use crate::domain::options::{
    OrderRequestBody, PaymentInitializeOptions, PaymentInstrument, PaymentPayload,
};
use crate::domain::ports::{CheckoutStoreRef, ClickListener, DocumentRef, ElementId};
use crate::domain::state::CheckoutState;
use crate::domain::vendor::GooglePaymentData;
use crate::error::{CheckoutError, MissingDataKind, NotInitializedKind, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, info};

/// Pays with a Google Pay wallet selection made before the order is placed.
///
/// The shopper opens the wallet from an optional page button; the selection
/// is tokenized and the checkout reloaded on the `widgetInteraction` queue.
/// `execute` then submits the nonce left on the payment method.
pub struct GooglePayPaymentStrategy {
    store: CheckoutStoreRef,
    processor: Arc<GooglePayProcessor>,
    document: DocumentRef,
    queue: Arc<SerializedQueue>,
    lifecycle: Lifecycle,
    method_id: Mutex<Option<String>>,
    wallet_button: Mutex<Option<ElementId>>,
    on_wallet_click: ClickListener,
}

impl GooglePayPaymentStrategy {
    pub fn new(
        store: CheckoutStoreRef,
        processor: Arc<GooglePayProcessor>,
        document: DocumentRef,
        queue: Arc<SerializedQueue>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this: &Weak<Self>| {
            let this = this.clone();
            let on_wallet_click = ClickListener::new(move || {
                let this = this.clone();
                Box::pin(async move {
                    match this.upgrade() {
                        Some(strategy) => strategy.handle_wallet_button_click().await,
                        None => Ok(()),
                    }
                })
            });

            Self {
                store,
                processor,
                document,
                queue,
                lifecycle: Lifecycle::new(NotInitializedKind::Payment),
                method_id: Mutex::new(None),
                wallet_button: Mutex::new(None),
                on_wallet_click,
            }
        })
    }

    fn method_id(&self) -> Result<String> {
        self.method_id
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(CheckoutError::NotInitialized(NotInitializedKind::Payment))
    }

    async fn handle_wallet_button_click(&self) -> Result<()> {
        match self.processor.display_wallet().await {
            Ok(payment_data) => self.payment_instrument_selected(payment_data).await,
            Err(error) if error.is_cancellation() => {
                debug!("Google Pay wallet dismissed");
                Ok(())
            }
            Err(error) => Err(error),
        }
    }

    async fn payment_instrument_selected(&self, payment_data: GooglePaymentData) -> Result<()> {
        let method_id = self.method_id()?;
        let store = self.store.clone();
        let processor = self.processor.clone();

        self.queue
            .run(WIDGET_INTERACTION, move || async move {
                processor.handle_success(&payment_data).await?;
                tokio::try_join!(
                    processor.update_billing_address(&payment_data.card_info.billing_address),
                    store.dispatch(CheckoutAction::LoadCurrentCheckout),
                    store.dispatch(CheckoutAction::LoadPaymentMethod {
                        method_id: method_id.clone(),
                    }),
                )?;
                Ok(())
            })
            .await
    }

    fn payment_payload(&self) -> Result<PaymentPayload> {
        let method_id = self.method_id()?;
        let state = self.store.state();
        let payment_method = state
            .payment_method(&method_id)
            .ok_or(CheckoutError::MissingData(MissingDataKind::PaymentMethod))?;
        let data = &payment_method.initialization_data;
        let nonce = data
            .nonce
            .clone()
            .ok_or(CheckoutError::MissingData(MissingDataKind::Payment))?;

        Ok(PaymentPayload {
            method_id,
            payment_data: PaymentInstrument::Wallet {
                nonce,
                card_type: data.card_information.as_ref().map(|c| c.r#type.clone()),
                last_four: data.card_information.as_ref().map(|c| c.number.clone()),
            },
        })
    }
}

#[async_trait]
impl PaymentStrategy for GooglePayPaymentStrategy {
    async fn initialize(&self, options: PaymentInitializeOptions) -> Result<CheckoutState> {
        self.lifecycle
            .initialize(|| async {
                let method_id = options
                    .method_id
                    .clone()
                    .ok_or(CheckoutError::missing_option("methodId"))?;
                let googlepay = options.googlepay.as_ref().ok_or_else(|| {
                    CheckoutError::InvalidArgument(
                        "Unable to initialize payment because \"options.googlepay\" argument is not provided."
                            .to_string(),
                    )
                })?;

                self.processor.initialize(&method_id).await?;

                if let Some(button) = googlepay
                    .wallet_button
                    .as_deref()
                    .and_then(|id| self.document.find_element(id))
                {
                    self.document
                        .add_click_listener(&button, self.on_wallet_click.clone());
                    *self.wallet_button.lock().unwrap_or_else(|e| e.into_inner()) = Some(button);
                }

                info!(method_id = %method_id, "initialized Google Pay payment strategy");
                *self.method_id.lock().unwrap_or_else(|e| e.into_inner()) = Some(method_id);
                Ok(())
            })
            .await?;

        Ok(self.store.state())
    }

    async fn deinitialize(&self) -> Result<CheckoutState> {
        self.lifecycle
            .deinitialize(|| async {
                let button = self.wallet_button.lock().unwrap_or_else(|e| e.into_inner()).take();
                if let Some(button) = button {
                    self.document
                        .remove_click_listener(&button, &self.on_wallet_click);
                }
                self.method_id.lock().unwrap_or_else(|e| e.into_inner()).take();
                self.processor.deinitialize().await
            })
            .await?;

        Ok(self.store.state())
    }

    async fn execute(&self, payload: OrderRequestBody) -> Result<CheckoutState> {
        self.lifecycle.ensure_initialized()?;
        let payment = self.payment_payload()?;

        self.store
            .dispatch(CheckoutAction::SubmitOrder(OrderRequestBody {
                use_store_credit: payload.use_store_credit,
                payment: None,
            }))
            .await?;
        self.store
            .dispatch(CheckoutAction::SubmitPayment(payment))
            .await
    }
}
