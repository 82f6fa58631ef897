//! Option and payload types passed into strategies by the hosting application.
//!
//! Every field a strategy requires is an `Option` here so that validation
//! happens inside `initialize` and yields a descriptive error instead of a
//! construction failure at the call site.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GooglePayPaymentOptions {
    /// Id of an existing element that opens the wallet when clicked.
    pub wallet_button: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SquareFormElement {
    pub element_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SquarePaymentOptions {
    pub card_number: SquareFormElement,
    pub cvv: SquareFormElement,
    pub expiration_date: SquareFormElement,
    pub postal_code: SquareFormElement,
    pub input_class: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PaymentInitializeOptions {
    pub method_id: Option<String>,
    pub googlepay: Option<GooglePayPaymentOptions>,
    pub square: Option<SquarePaymentOptions>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WalletContainerOptions {
    pub container: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CustomerInitializeOptions {
    pub method_id: Option<String>,
    pub googlepaybraintree: Option<WalletContainerOptions>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShippingInitializeOptions {
    pub method_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CheckoutButtonInitializeOptions {
    pub method_id: Option<String>,
    pub container_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceInstrument {
    pub nonce: String,
}

/// What a payment carries: either a tokenized instrument or nothing yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentInstrument {
    Nonce(NonceInstrument),
    Wallet {
        nonce: String,
        card_type: Option<String>,
        last_four: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderPaymentRequestBody {
    pub method_id: Option<String>,
    pub payment_data: Option<PaymentInstrument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderRequestBody {
    pub use_store_credit: bool,
    pub payment: Option<OrderPaymentRequestBody>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPayload {
    pub method_id: String,
    pub payment_data: PaymentInstrument,
}
