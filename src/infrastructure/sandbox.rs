//! Scriptable stand-ins for the Google Pay and Square SDKs.

use crate::config::{GooglePaySandboxConfig, SquareSandboxConfig};
use crate::domain::ports::WalletButton;
use crate::domain::state::{Checkout, PaymentMethod};
use crate::domain::vendor::{
    CardData, CardNonceResponse, DigitalWalletType, GooglePayClient, GooglePayEnvironment,
    GooglePayInitializer, GooglePayPaymentDataRequest, GooglePayScriptLoader, GooglePaymentData,
    NonceGenerationError, SquareForm, SquareFormFactory, SquareFormOptions, SquareScriptLoader,
    TokenizeDetails, TokenizePayload,
};
use crate::error::{Result, VendorError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Google Pay SDK double. Acts as both the script loader and the gateway
/// initializer, counting how often each step runs.
#[derive(Debug, Default)]
pub struct SandboxGooglePay {
    settings: GooglePaySandboxConfig,
    loads: AtomicUsize,
    configures: AtomicUsize,
    teardowns: AtomicUsize,
}

impl SandboxGooglePay {
    pub fn new(settings: GooglePaySandboxConfig) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// How many times the wallet was configured for a checkout.
    pub fn configure_count(&self) -> usize {
        self.configures.load(Ordering::SeqCst)
    }

    pub fn teardown_count(&self) -> usize {
        self.teardowns.load(Ordering::SeqCst)
    }
}

struct SandboxGooglePayClient {
    environment: GooglePayEnvironment,
    settings: GooglePaySandboxConfig,
}

#[async_trait]
impl GooglePayClient for SandboxGooglePayClient {
    async fn is_ready_to_pay(&self, allowed_payment_methods: &[String]) -> Result<bool> {
        Ok(self.settings.ready_to_pay && !allowed_payment_methods.is_empty())
    }

    async fn load_payment_data(
        &self,
        _request: &GooglePayPaymentDataRequest,
    ) -> Result<GooglePaymentData> {
        if self.settings.cancel_wallet {
            return Err(VendorError::Cancelled.into());
        }
        Ok(self.settings.payment_data.clone())
    }

    fn create_button(&self) -> WalletButton {
        let label = match self.environment {
            GooglePayEnvironment::Test => "Google Pay (test)",
            GooglePayEnvironment::Production => "Google Pay",
        };
        WalletButton {
            label: label.to_string(),
        }
    }
}

#[async_trait]
impl GooglePayScriptLoader for SandboxGooglePay {
    async fn load(&self, environment: GooglePayEnvironment) -> Result<Arc<dyn GooglePayClient>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(SandboxGooglePayClient {
            environment,
            settings: self.settings.clone(),
        }))
    }
}

#[async_trait]
impl GooglePayInitializer for SandboxGooglePay {
    async fn initialize(
        &self,
        checkout: &Checkout,
        payment_method: &PaymentMethod,
        has_shipping_address: bool,
    ) -> Result<GooglePayPaymentDataRequest> {
        if payment_method.initialization_data.client_token.is_none() {
            return Err(VendorError::Sdk(format!(
                "payment method \"{}\" has no client token",
                payment_method.id
            ))
            .into());
        }

        self.configures.fetch_add(1, Ordering::SeqCst);
        debug!(checkout_id = %checkout.id, method_id = %payment_method.id, "configured sandbox wallet");
        Ok(GooglePayPaymentDataRequest {
            allowed_payment_methods: vec!["CARD".to_string(), "TOKENIZED_CARD".to_string()],
            currency_code: "USD".to_string(),
            total_price: checkout.subtotal,
            shipping_address_required: !has_shipping_address,
        })
    }

    async fn parse_response(&self, payment_data: &GooglePaymentData) -> Result<TokenizePayload> {
        Ok(TokenizePayload {
            nonce: format!("fake-nonce-{}", payment_data.payment_method_token),
            r#type: "AndroidPayCard".to_string(),
            details: TokenizeDetails {
                card_type: payment_data.card_info.card_network.clone(),
                last_four: payment_data.card_info.card_details.clone(),
            },
        })
    }

    async fn teardown(&self) -> Result<()> {
        self.teardowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Square SDK double. Keeps every form it creates so tests can drive their
/// callbacks.
#[derive(Debug, Default)]
pub struct SandboxSquare {
    settings: SquareSandboxConfig,
    forms: Arc<Mutex<Vec<Arc<SandboxSquareForm>>>>,
}

impl SandboxSquare {
    pub fn new(settings: SquareSandboxConfig) -> Self {
        Self {
            settings,
            forms: Arc::default(),
        }
    }

    pub fn latest_form(&self) -> Option<Arc<SandboxSquareForm>> {
        self.forms
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    pub fn form_count(&self) -> usize {
        self.forms.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl SquareScriptLoader for SandboxSquare {
    async fn load(&self) -> Result<Arc<dyn SquareFormFactory>> {
        Ok(Arc::new(SandboxSquareFactory {
            settings: self.settings.clone(),
            forms: self.forms.clone(),
        }))
    }
}

struct SandboxSquareFactory {
    settings: SquareSandboxConfig,
    forms: Arc<Mutex<Vec<Arc<SandboxSquareForm>>>>,
}

impl SquareFormFactory for SandboxSquareFactory {
    fn create(&self, options: SquareFormOptions) -> Arc<dyn SquareForm> {
        let form = Arc::new(SandboxSquareForm {
            options,
            settings: self.settings.clone(),
            postal_code: Mutex::new(None),
            nonce_requests: AtomicUsize::new(0),
        });
        self.forms
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(form.clone());
        form
    }
}

/// A hosted card form that answers immediately from its settings.
pub struct SandboxSquareForm {
    options: SquareFormOptions,
    settings: SquareSandboxConfig,
    postal_code: Mutex<Option<String>>,
    nonce_requests: AtomicUsize,
}

impl std::fmt::Debug for SandboxSquareForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SandboxSquareForm")
            .field("card_number", &self.options.card_number)
            .field("nonce_requests", &self.nonce_requests)
            .finish()
    }
}

impl SandboxSquareForm {
    pub fn application_id(&self) -> Option<&str> {
        self.options.application_id.as_deref()
    }

    pub fn postal_code(&self) -> Option<String> {
        self.postal_code
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn nonce_request_count(&self) -> usize {
        self.nonce_requests.load(Ordering::SeqCst)
    }

    /// Delivers `response` as if the form had produced it.
    pub async fn respond(&self, response: CardNonceResponse) -> Result<()> {
        self.options
            .callbacks
            .card_nonce_response_received(response)
            .await
    }

    /// Simulates the shopper completing a digital wallet inside the form.
    pub async fn complete_digital_wallet(&self, wallet: DigitalWalletType) -> Result<()> {
        self.respond(CardNonceResponse {
            errors: None,
            nonce: Some("cnon:sandbox-wallet".to_string()),
            card_data: Some(CardData {
                card_brand: "VISA".to_string(),
                last_4: "1111".to_string(),
                digital_wallet_type: wallet,
            }),
        })
        .await
    }

    fn card_response(&self, sequence: usize) -> CardNonceResponse {
        if !self.settings.nonce_errors.is_empty() {
            return CardNonceResponse {
                errors: Some(
                    self.settings
                        .nonce_errors
                        .iter()
                        .map(|message| NonceGenerationError {
                            message: message.clone(),
                        })
                        .collect(),
                ),
                ..Default::default()
            };
        }

        CardNonceResponse {
            errors: None,
            nonce: Some(format!("cnon:sandbox-{sequence}")),
            card_data: Some(CardData {
                card_brand: "VISA".to_string(),
                last_4: "1111".to_string(),
                digital_wallet_type: DigitalWalletType::None,
            }),
        }
    }
}

impl SquareForm for SandboxSquareForm {
    fn build(&self) {
        if self.settings.form_never_loads {
            debug!("leaving form build unanswered");
        } else if self.settings.unsupported_browser {
            self.options.callbacks.unsupported_browser_detected();
        } else {
            self.options.callbacks.payment_form_loaded();
        }
    }

    fn request_card_nonce(&self) {
        let sequence = self.nonce_requests.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.settings.respond_to_nonce_requests {
            debug!(sequence, "leaving nonce request unanswered");
            return;
        }

        let response = self.card_response(sequence);
        let callbacks = self.options.callbacks.clone();
        tokio::spawn(async move {
            if let Err(error) = callbacks.card_nonce_response_received(response).await {
                warn!(%error, "card nonce callback failed");
            }
        });
    }

    fn set_postal_code(&self, postal_code: &str) {
        *self.postal_code.lock().unwrap_or_else(|e| e.into_inner()) = Some(postal_code.to_string());
    }
}
