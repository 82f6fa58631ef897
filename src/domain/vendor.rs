//! Contracts for the vendor SDKs the concrete strategies drive.
//!
//! Only the calls the strategies make are modelled. Script loading, iframe
//! hosting and the vendors' own protocols live behind these traits.

use super::ports::WalletButton;
use super::state::{Address, Checkout, PaymentMethod};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GooglePayAddress {
    pub name: String,
    pub company_name: String,
    pub address1: String,
    pub address2: String,
    pub address3: String,
    pub locality: String,
    pub administrative_area: String,
    pub postal_code: String,
    pub country_code: String,
    pub phone_number: String,
}

impl From<&GooglePayAddress> for Address {
    fn from(address: &GooglePayAddress) -> Self {
        let (first_name, last_name) = match address.name.rsplit_once(' ') {
            Some((first, last)) => (first.to_string(), last.to_string()),
            None => (String::new(), address.name.clone()),
        };

        Address {
            first_name,
            last_name,
            company: address.company_name.clone(),
            address1: address.address1.clone(),
            address2: format!("{}{}", address.address2, address.address3),
            city: address.locality.clone(),
            state_or_province: address.administrative_area.clone(),
            postal_code: address.postal_code.clone(),
            country_code: address.country_code.clone(),
            phone: address.phone_number.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GooglePayCardInfo {
    pub card_network: String,
    pub card_details: String,
    pub billing_address: GooglePayAddress,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GooglePaymentData {
    pub card_info: GooglePayCardInfo,
    pub shipping_address: GooglePayAddress,
    pub payment_method_token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GooglePayPaymentDataRequest {
    pub allowed_payment_methods: Vec<String>,
    pub currency_code: String,
    pub total_price: Decimal,
    pub shipping_address_required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GooglePayEnvironment {
    Test,
    Production,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizeDetails {
    pub card_type: String,
    pub last_four: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizePayload {
    pub nonce: String,
    pub r#type: String,
    pub details: TokenizeDetails,
}

#[async_trait]
pub trait GooglePayClient: Send + Sync {
    async fn is_ready_to_pay(&self, allowed_payment_methods: &[String]) -> Result<bool>;
    /// Opens the wallet sheet. Rejects with `VendorError::Cancelled` when the
    /// shopper closes it.
    async fn load_payment_data(
        &self,
        request: &GooglePayPaymentDataRequest,
    ) -> Result<GooglePaymentData>;
    fn create_button(&self) -> WalletButton;
}

#[async_trait]
pub trait GooglePayScriptLoader: Send + Sync {
    async fn load(&self, environment: GooglePayEnvironment) -> Result<Arc<dyn GooglePayClient>>;
}

/// Processor-specific glue between Google Pay and the gateway (Braintree).
#[async_trait]
pub trait GooglePayInitializer: Send + Sync {
    async fn initialize(
        &self,
        checkout: &Checkout,
        payment_method: &PaymentMethod,
        has_shipping_address: bool,
    ) -> Result<GooglePayPaymentDataRequest>;
    async fn parse_response(&self, payment_data: &GooglePaymentData) -> Result<TokenizePayload>;
    async fn teardown(&self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DigitalWalletType {
    None,
    Masterpass,
    ApplePay,
    GooglePay,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardData {
    pub card_brand: String,
    pub last_4: String,
    pub digital_wallet_type: DigitalWalletType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceGenerationError {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CardNonceResponse {
    pub errors: Option<Vec<NonceGenerationError>>,
    pub nonce: Option<String>,
    pub card_data: Option<CardData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquarePaymentTotal {
    pub label: String,
    pub amount: String,
    pub pending: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquarePaymentRequest {
    pub request_shipping_address: bool,
    pub request_billing_info: bool,
    pub currency_code: String,
    pub country_code: String,
    pub total: SquarePaymentTotal,
}

/// Field name to messages, as reported by the hosted form.
pub type SquareValidationErrors = BTreeMap<String, Vec<String>>;

/// Callbacks the hosted Square form invokes. Implemented by the strategy.
#[async_trait]
pub trait SquareFormCallbacks: Send + Sync {
    fn payment_form_loaded(&self);
    fn unsupported_browser_detected(&self);
    async fn card_nonce_response_received(&self, response: CardNonceResponse) -> Result<()>;
    fn create_payment_request(&self) -> Result<SquarePaymentRequest>;
    fn validate_shipping_contact(&self, errors: &SquareValidationErrors) -> Result<()>;
}

#[derive(Clone)]
pub struct SquareFormOptions {
    pub card_number: String,
    pub cvv: String,
    pub expiration_date: String,
    pub postal_code: String,
    pub input_class: Option<String>,
    pub application_id: Option<String>,
    pub callbacks: Arc<dyn SquareFormCallbacks>,
}

pub trait SquareForm: Send + Sync {
    fn build(&self);
    fn request_card_nonce(&self);
    fn set_postal_code(&self, postal_code: &str);
}

pub trait SquareFormFactory: Send + Sync {
    fn create(&self, options: SquareFormOptions) -> Arc<dyn SquareForm>;
}

#[async_trait]
pub trait SquareScriptLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn SquareFormFactory>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_pay_address_splits_name() {
        let address = GooglePayAddress {
            name: "Ada Byron Lovelace".to_string(),
            address2: "Flat 2".to_string(),
            address3: ", Rear".to_string(),
            ..Default::default()
        };

        let mapped = Address::from(&address);
        assert_eq!(mapped.first_name, "Ada Byron");
        assert_eq!(mapped.last_name, "Lovelace");
        assert_eq!(mapped.address2, "Flat 2, Rear");
    }

    #[test]
    fn test_single_word_name_is_last_name() {
        let address = GooglePayAddress {
            name: "Prince".to_string(),
            ..Default::default()
        };

        let mapped = Address::from(&address);
        assert_eq!(mapped.first_name, "");
        assert_eq!(mapped.last_name, "Prince");
    }
}
