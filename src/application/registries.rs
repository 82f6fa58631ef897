//! Composition root: one registry per strategy family, keyed by method.
//!
//! Factories only wire collaborators together. Nothing touches the store or a
//! vendor SDK until a strategy's `initialize` runs.

use crate::application::checkout_button::GooglePayBraintreeButtonStrategy;
use crate::application::customer::{DefaultCustomerStrategy, GooglePayBraintreeCustomerStrategy};
use crate::application::googlepay::GooglePayProcessor;
use crate::application::payment::{GooglePayPaymentStrategy, SquarePaymentStrategy};
use crate::application::queue::SerializedQueue;
use crate::application::registry::Registry;
use crate::application::shipping::{ConsignmentShippingStrategy, ShippingStrategyRunner};
use crate::application::strategy::{
    CheckoutButtonStrategy, CustomerStrategy, PaymentStrategy, ShippingStrategy,
};
use crate::domain::method::MethodKey;
use crate::domain::ports::{CheckoutStoreRef, DocumentRef, FormPosterRef, RequestSenderRef};
use crate::domain::vendor::{GooglePayInitializer, GooglePayScriptLoader, SquareScriptLoader};
use crate::error::Result;
use std::sync::Arc;

/// Everything a strategy factory may hand to a strategy.
#[derive(Clone)]
pub struct Collaborators {
    pub store: CheckoutStoreRef,
    pub request_sender: RequestSenderRef,
    pub form_poster: FormPosterRef,
    pub document: DocumentRef,
    pub google_pay_loader: Arc<dyn GooglePayScriptLoader>,
    pub google_pay_initializer: Arc<dyn GooglePayInitializer>,
    pub square_loader: Arc<dyn SquareScriptLoader>,
    pub queue: Arc<SerializedQueue>,
}

impl Collaborators {
    /// Each Google Pay strategy owns its own processor so that tearing one
    /// down never releases another's wallet session.
    fn google_pay_processor(&self, shipping: &Arc<ShippingStrategyRunner>) -> Arc<GooglePayProcessor> {
        Arc::new(GooglePayProcessor::new(
            self.store.clone(),
            self.google_pay_loader.clone(),
            self.google_pay_initializer.clone(),
            self.request_sender.clone(),
            shipping.clone(),
        ))
    }
}

pub type PaymentRegistry = Registry<dyn PaymentStrategy>;
pub type CustomerRegistry = Registry<dyn CustomerStrategy>;
pub type ShippingRegistry = Registry<dyn ShippingStrategy>;
pub type CheckoutButtonRegistry = Registry<dyn CheckoutButtonStrategy>;

pub fn create_shipping_registry(collaborators: &Collaborators) -> Result<ShippingRegistry> {
    let registry = ShippingRegistry::new();

    for method in [MethodKey::Default, MethodKey::GooglePayBraintree] {
        let store = collaborators.store.clone();
        let key = method.clone();
        registry.register(method, move || -> Arc<dyn ShippingStrategy> {
            Arc::new(ConsignmentShippingStrategy::new(key.clone(), store.clone()))
        })?;
    }

    Ok(registry)
}

pub fn create_payment_registry(
    collaborators: &Collaborators,
    shipping: Arc<ShippingStrategyRunner>,
) -> Result<PaymentRegistry> {
    let registry = PaymentRegistry::new();

    for method in [MethodKey::GooglePay, MethodKey::GooglePayBraintree] {
        let deps = collaborators.clone();
        let shipping = shipping.clone();
        registry.register(method, move || -> Arc<dyn PaymentStrategy> {
            GooglePayPaymentStrategy::new(
                deps.store.clone(),
                deps.google_pay_processor(&shipping),
                deps.document.clone(),
                deps.queue.clone(),
            )
        })?;
    }

    let deps = collaborators.clone();
    registry.register(MethodKey::SquareV2, move || -> Arc<dyn PaymentStrategy> {
        Arc::new(SquarePaymentStrategy::new(
            deps.store.clone(),
            deps.request_sender.clone(),
            deps.square_loader.clone(),
            deps.queue.clone(),
        ))
    })?;

    Ok(registry)
}

pub fn create_customer_registry(
    collaborators: &Collaborators,
    shipping: Arc<ShippingStrategyRunner>,
) -> Result<CustomerRegistry> {
    let registry = CustomerRegistry::new();

    let deps = collaborators.clone();
    registry.register(MethodKey::GooglePayBraintree, move || -> Arc<dyn CustomerStrategy> {
        GooglePayBraintreeCustomerStrategy::new(
            deps.store.clone(),
            deps.google_pay_processor(&shipping),
            deps.document.clone(),
            deps.form_poster.clone(),
            deps.queue.clone(),
        )
    })?;

    let store = collaborators.store.clone();
    registry.register(MethodKey::Default, move || -> Arc<dyn CustomerStrategy> {
        Arc::new(DefaultCustomerStrategy::new(store.clone()))
    })?;

    Ok(registry)
}

pub fn create_checkout_button_registry(
    collaborators: &Collaborators,
    shipping: Arc<ShippingStrategyRunner>,
) -> Result<CheckoutButtonRegistry> {
    let registry = CheckoutButtonRegistry::new();

    let deps = collaborators.clone();
    registry.register(
        MethodKey::GooglePayBraintree,
        move || -> Arc<dyn CheckoutButtonStrategy> {
            GooglePayBraintreeButtonStrategy::new(
                deps.store.clone(),
                deps.google_pay_processor(&shipping),
                deps.document.clone(),
                deps.form_poster.clone(),
                deps.queue.clone(),
            )
        },
    )?;

    Ok(registry)
}

/// The four registries wired against one set of collaborators.
pub struct StrategyRegistries {
    pub payment: Arc<PaymentRegistry>,
    pub customer: Arc<CustomerRegistry>,
    pub shipping: Arc<ShippingRegistry>,
    pub checkout_button: Arc<CheckoutButtonRegistry>,
    pub shipping_runner: Arc<ShippingStrategyRunner>,
}

impl StrategyRegistries {
    pub fn new(collaborators: &Collaborators) -> Result<Self> {
        let shipping = Arc::new(create_shipping_registry(collaborators)?);
        let shipping_runner = Arc::new(ShippingStrategyRunner::new(
            collaborators.store.clone(),
            shipping.clone(),
            collaborators.queue.clone(),
        ));

        Ok(Self {
            payment: Arc::new(create_payment_registry(collaborators, shipping_runner.clone())?),
            customer: Arc::new(create_customer_registry(collaborators, shipping_runner.clone())?),
            checkout_button: Arc::new(create_checkout_button_registry(
                collaborators,
                shipping_runner.clone(),
            )?),
            shipping,
            shipping_runner,
        })
    }
}
