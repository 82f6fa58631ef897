use crate::application::googlepay::GooglePayProcessor;
use crate::application::lifecycle::Lifecycle;
use crate::application::queue::{SerializedQueue, WIDGET_INTERACTION};
use crate::application::strategy::CustomerStrategy;
use crate::domain::action::CheckoutAction;
use crate::domain::options::{CustomerCredentials, CustomerInitializeOptions};
use crate::domain::ports::{
    CheckoutStoreRef, ClickListener, DocumentRef, ElementId, FormPosterRef, PostRequest,
};
use crate::domain::state::CheckoutState;
use crate::error::{CheckoutError, NotInitializedKind, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, info, warn};

/// Signs the shopper in by selecting a Google Pay wallet (Braintree gateway).
///
/// Initialization renders the wallet button into the configured container.
/// Programmatic sign-in is not supported; the button click drives the flow.
pub struct GooglePayBraintreeCustomerStrategy {
    store: CheckoutStoreRef,
    processor: Arc<GooglePayProcessor>,
    document: DocumentRef,
    form_poster: FormPosterRef,
    queue: Arc<SerializedQueue>,
    lifecycle: Lifecycle,
    wallet_button: Mutex<Option<ElementId>>,
    on_wallet_click: ClickListener,
}

impl GooglePayBraintreeCustomerStrategy {
    pub fn new(
        store: CheckoutStoreRef,
        processor: Arc<GooglePayProcessor>,
        document: DocumentRef,
        form_poster: FormPosterRef,
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
                form_poster,
                queue,
                lifecycle: Lifecycle::new(NotInitializedKind::Customer),
                wallet_button: Mutex::new(None),
                on_wallet_click,
            }
        })
    }

    async fn handle_wallet_button_click(&self) -> Result<()> {
        let payment_data = match self.processor.display_wallet().await {
            Ok(payment_data) => payment_data,
            Err(error) if error.is_cancellation() => {
                debug!("Google Pay wallet dismissed");
                return Ok(());
            }
            Err(error) => return Err(error),
        };

        self.processor.handle_success(&payment_data).await?;

        let processor = self.processor.clone();
        self.queue
            .run(WIDGET_INTERACTION, move || async move {
                tokio::try_join!(
                    processor.update_shipping_address(&payment_data.shipping_address),
                    processor.update_billing_address(&payment_data.card_info.billing_address),
                )?;
                Ok(())
            })
            .await?;

        self.form_poster
            .post_form("/checkout.php", PostRequest::form_encoded());
        Ok(())
    }
}

#[async_trait]
impl CustomerStrategy for GooglePayBraintreeCustomerStrategy {
    async fn initialize(&self, options: CustomerInitializeOptions) -> Result<CheckoutState> {
        self.lifecycle
            .initialize(|| async {
                let method_id = options
                    .method_id
                    .as_deref()
                    .ok_or(CheckoutError::missing_option("methodId"))?;
                let container = options
                    .googlepaybraintree
                    .as_ref()
                    .map(|wallet| wallet.container.as_str())
                    .ok_or(CheckoutError::missing_option("googlepaybraintree"))?;
                if container.is_empty() || self.document.find_element(container).is_none() {
                    return Err(CheckoutError::InvalidArgument(
                        "Unable to create sign-in button without valid container ID.".to_string(),
                    ));
                }

                self.processor.initialize(method_id).await?;

                let mounted = self
                    .processor
                    .create_button()
                    .and_then(|button| self.document.mount(container, button));
                let element = match mounted {
                    Ok(element) => element,
                    Err(error) => {
                        if let Err(teardown) = self.processor.deinitialize().await {
                            warn!(%teardown, "failed to release Google Pay after mount failure");
                        }
                        return Err(error);
                    }
                };

                self.document
                    .add_click_listener(&element, self.on_wallet_click.clone());
                *self.wallet_button.lock().unwrap_or_else(|e| e.into_inner()) = Some(element);
                info!(method_id, container, "initialized Google Pay customer strategy");
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
                    self.document.unmount(&button);
                }
                self.processor.deinitialize().await
            })
            .await?;

        Ok(self.store.state())
    }

    async fn sign_in(&self, _credentials: CustomerCredentials) -> Result<CheckoutState> {
        Err(CheckoutError::NotImplemented(
            "In order to sign in via Google Pay, the shopper must click on \"Google Pay\" button."
                .to_string(),
        ))
    }

    async fn sign_out(&self) -> Result<CheckoutState> {
        let state = self.store.state();
        let Some(provider_id) = state.payment_provider_id().map(str::to_string) else {
            return Ok(state);
        };

        self.store
            .dispatch(CheckoutAction::RemoteSignOut { provider_id })
            .await
    }
}
