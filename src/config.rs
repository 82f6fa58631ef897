//! Sandbox environment the binary composes strategies against.

use crate::domain::state::{
    Address, BillingAddress, Cart, Checkout, InitializationData, PaymentMethod,
    PaymentMethodConfig, StoreConfig,
};
use crate::domain::vendor::{GooglePayAddress, GooglePayCardInfo, GooglePaymentData};
use crate::error::Result;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// What the remote store knows before any strategy runs.
///
/// Every field has a default, so a JSON file only needs the parts it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub checkout: Option<Checkout>,
    pub store: StoreConfig,
    pub payment_methods: Vec<PaymentMethod>,
    pub billing_address: Option<BillingAddress>,
    pub shipping_address: Option<Address>,
    /// Provider of an already established wallet session, if any.
    pub payment_provider: Option<String>,
    /// Ids of the elements present on the page.
    pub containers: Vec<String>,
    /// Artificial latency applied to every store dispatch.
    pub dispatch_delay_ms: u64,
    pub google_pay: GooglePaySandboxConfig,
    pub square: SquareSandboxConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GooglePaySandboxConfig {
    pub ready_to_pay: bool,
    /// Dismiss the wallet sheet instead of returning payment data.
    pub cancel_wallet: bool,
    pub payment_data: GooglePaymentData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SquareSandboxConfig {
    pub unsupported_browser: bool,
    /// When true, `build` never reports back, as with a blocked iframe.
    pub form_never_loads: bool,
    /// Messages reported instead of a nonce.
    pub nonce_errors: Vec<String>,
    /// When false, nonce requests are left unanswered.
    pub respond_to_nonce_requests: bool,
}

impl SandboxConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

fn sandbox_method(id: &str, client_token: &str) -> PaymentMethod {
    PaymentMethod {
        id: id.to_string(),
        config: PaymentMethodConfig { test_mode: true },
        initialization_data: InitializationData {
            client_token: Some(client_token.to_string()),
            ..Default::default()
        },
    }
}

fn sandbox_address(postal_code: &str) -> Address {
    Address {
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        address1: "1 Market St".to_string(),
        city: "San Francisco".to_string(),
        state_or_province: "CA".to_string(),
        postal_code: postal_code.to_string(),
        country_code: "US".to_string(),
        ..Default::default()
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            checkout: Some(Checkout {
                id: "checkout-1".to_string(),
                cart: Cart {
                    id: "cart-1".to_string(),
                },
                subtotal: dec!(42.50),
            }),
            store: StoreConfig {
                currency_code: "USD".to_string(),
                store_name: "Sandbox Store".to_string(),
            },
            payment_methods: vec![
                sandbox_method("googlepay", "sandbox-googlepay-token"),
                sandbox_method("googlepaybraintree", "sandbox-braintree-token"),
                sandbox_method("squarev2", "sandbox-sq0idp"),
            ],
            billing_address: Some(BillingAddress {
                id: "billing-1".to_string(),
                address: sandbox_address("94105"),
            }),
            shipping_address: None,
            payment_provider: None,
            containers: [
                "wallet-button",
                "login-container",
                "cart-button",
                "mini-cart-button",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            dispatch_delay_ms: 0,
            google_pay: GooglePaySandboxConfig::default(),
            square: SquareSandboxConfig::default(),
        }
    }
}

impl Default for GooglePaySandboxConfig {
    fn default() -> Self {
        let address = GooglePayAddress {
            name: "Jane Doe".to_string(),
            address1: "1 Market St".to_string(),
            locality: "San Francisco".to_string(),
            administrative_area: "CA".to_string(),
            postal_code: "94105".to_string(),
            country_code: "US".to_string(),
            ..Default::default()
        };

        Self {
            ready_to_pay: true,
            cancel_wallet: false,
            payment_data: GooglePaymentData {
                card_info: GooglePayCardInfo {
                    card_network: "VISA".to_string(),
                    card_details: "1111".to_string(),
                    billing_address: address.clone(),
                },
                shipping_address: address,
                payment_method_token: "sandbox-token".to_string(),
            },
        }
    }
}

impl Default for SquareSandboxConfig {
    fn default() -> Self {
        Self {
            unsupported_browser: false,
            form_never_loads: false,
            nonce_errors: Vec::new(),
            respond_to_nonce_requests: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_knows_sandbox_methods() {
        let config = SandboxConfig::default();
        let ids: Vec<_> = config.payment_methods.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["googlepay", "googlepaybraintree", "squarev2"]);
        assert!(config.google_pay.ready_to_pay);
        assert!(config.square.respond_to_nonce_requests);
    }

    #[test]
    fn test_load_partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "containers": ["only-this"], "google_pay": {{ "cancel_wallet": true }} }}"#
        )
        .unwrap();

        let config = SandboxConfig::load(file.path()).unwrap();
        assert_eq!(config.containers, vec!["only-this".to_string()]);
        assert!(config.google_pay.cancel_wallet);
        assert!(config.google_pay.ready_to_pay);
        assert_eq!(config.store.currency_code, "USD");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = SandboxConfig::load("does/not/exist.json");
        assert!(matches!(result, Err(crate::error::CheckoutError::IoError(_))));
    }
}
