use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkout {
    pub id: String,
    pub cart: Cart,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub currency_code: String,
    pub store_name: String,
}

/// Vendor configuration returned by the remote store for one method.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaymentMethodConfig {
    pub test_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InitializationData {
    pub client_token: Option<String>,
    /// Nonce left on the method by a completed wallet flow.
    pub nonce: Option<String>,
    pub card_information: Option<CardInformation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardInformation {
    pub r#type: String,
    pub number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
    pub config: PaymentMethodConfig,
    pub initialization_data: InitializationData,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub state_or_province: String,
    pub postal_code: String,
    pub country_code: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingAddress {
    pub id: String,
    pub address: Address,
}

/// The provider currently holding a remote (wallet) checkout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentProvider {
    pub provider_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub email: String,
}

/// Read-only snapshot of the application's checkout store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CheckoutState {
    pub checkout: Option<Checkout>,
    pub config: Option<StoreConfig>,
    pub payment_methods: HashMap<String, PaymentMethod>,
    pub billing_address: Option<BillingAddress>,
    pub shipping_address: Option<Address>,
    pub shipping_option_id: Option<String>,
    pub payment: Option<PaymentProvider>,
    pub customer: Option<Customer>,
    pub order_id: Option<String>,
}

impl CheckoutState {
    pub fn payment_method(&self, method_id: &str) -> Option<&PaymentMethod> {
        self.payment_methods.get(method_id)
    }

    pub fn has_shipping_address(&self) -> bool {
        self.shipping_address.is_some()
    }

    pub fn payment_provider_id(&self) -> Option<&str> {
        self.payment.as_ref().map(|p| p.provider_id.as_str())
    }
}
