use crate::application::googlepay::GooglePayProcessor;
use crate::application::lifecycle::ContainerLifecycle;
use crate::application::queue::{SerializedQueue, WIDGET_INTERACTION};
use crate::application::strategy::CheckoutButtonStrategy;
use crate::domain::action::CheckoutAction;
use crate::domain::options::CheckoutButtonInitializeOptions;
use crate::domain::ports::{
    CheckoutStoreRef, ClickListener, DocumentRef, ElementId, FormPosterRef, PostRequest,
};
use crate::error::{CheckoutError, MissingDataKind, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, info, warn};

/// Renders a Google Pay (Braintree) button into any number of containers.
///
/// The wallet is configured when the first container is bound and released
/// when the last one is unbound. Every button shares one click listener.
pub struct GooglePayBraintreeButtonStrategy {
    store: CheckoutStoreRef,
    processor: Arc<GooglePayProcessor>,
    document: DocumentRef,
    form_poster: FormPosterRef,
    queue: Arc<SerializedQueue>,
    containers: ContainerLifecycle,
    buttons: Mutex<HashMap<String, ElementId>>,
    on_wallet_click: ClickListener,
}

impl GooglePayBraintreeButtonStrategy {
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
                containers: ContainerLifecycle::new(),
                buttons: Mutex::new(HashMap::new()),
                on_wallet_click,
            }
        })
    }

    /// Loads the cart-backed checkout and configures the wallet for it.
    async fn configure_wallet(&self, method_id: &str) -> Result<()> {
        let state = self.store.dispatch(CheckoutAction::LoadDefaultCheckout).await?;
        if !state
            .checkout
            .is_some_and(|checkout| !checkout.cart.id.is_empty())
        {
            return Err(CheckoutError::MissingData(MissingDataKind::Cart));
        }

        self.processor.initialize(method_id).await
    }

    fn mount_button(&self, container_id: &str) -> Result<ElementId> {
        let button = self.processor.create_button()?;
        let element = self.document.mount(container_id, button)?;
        self.document
            .add_click_listener(&element, self.on_wallet_click.clone());
        Ok(element)
    }

    fn unmount_button(&self, container_id: &str) {
        let element = self
            .buttons
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(container_id);
        if let Some(element) = element {
            self.document
                .remove_click_listener(&element, &self.on_wallet_click);
            self.document.unmount(&element);
        }
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
        let method_id = self
            .processor
            .method_id()
            .ok_or(CheckoutError::Synchronization)?;

        self.processor.handle_success(&payment_data).await?;

        let store = self.store.clone();
        let processor = self.processor.clone();
        self.queue
            .run(WIDGET_INTERACTION, move || async move {
                tokio::try_join!(
                    processor.update_shipping_address(&payment_data.shipping_address),
                    store.dispatch(CheckoutAction::LoadCurrentCheckout),
                    store.dispatch(CheckoutAction::LoadPaymentMethod { method_id }),
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
impl CheckoutButtonStrategy for GooglePayBraintreeButtonStrategy {
    async fn initialize(&self, options: CheckoutButtonInitializeOptions) -> Result<()> {
        let container_id = options
            .container_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(CheckoutError::missing_option("containerId"))?;
        let method_id = options.method_id.as_deref();

        self.containers
            .initialize(container_id, |is_first| async move {
                let method_id = method_id.ok_or(CheckoutError::missing_option("methodId"))?;
                if self.document.find_element(container_id).is_none() {
                    return Err(CheckoutError::InvalidArgument(format!(
                        "Unable to find the container \"{container_id}\" for the Google Pay button."
                    )));
                }

                if is_first {
                    self.configure_wallet(method_id).await?;
                }

                let element = match self.mount_button(container_id) {
                    Ok(element) => element,
                    Err(error) => {
                        if is_first {
                            if let Err(teardown) = self.processor.deinitialize().await {
                                warn!(%teardown, "failed to release Google Pay after mount failure");
                            }
                        }
                        return Err(error);
                    }
                };

                info!(method_id, container_id, "mounted Google Pay checkout button");
                self.buttons
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .insert(container_id.to_string(), element);
                Ok(())
            })
            .await?;

        Ok(())
    }

    async fn deinitialize(&self, container_id: Option<&str>) -> Result<()> {
        self.containers
            .deinitialize(container_id, |released, now_empty| async move {
                for container_id in &released {
                    self.unmount_button(container_id);
                }
                if now_empty {
                    self.processor.deinitialize().await?;
                }
                Ok(())
            })
            .await?;

        Ok(())
    }
}
