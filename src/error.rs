use thiserror::Error;

/// Data a strategy expected to find in the checkout state but did not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingDataKind {
    PaymentMethod,
    Payment,
    Checkout,
    CheckoutConfig,
    Cart,
    BillingAddress,
    Options(&'static str),
}

impl std::fmt::Display for MissingDataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingDataKind::PaymentMethod => write!(f, "payment method"),
            MissingDataKind::Payment => write!(f, "payment"),
            MissingDataKind::Checkout => write!(f, "checkout"),
            MissingDataKind::CheckoutConfig => write!(f, "checkout config"),
            MissingDataKind::Cart => write!(f, "cart"),
            MissingDataKind::BillingAddress => write!(f, "billing address"),
            MissingDataKind::Options(field) => write!(f, "required option \"{}\"", field),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotInitializedKind {
    Payment,
    Customer,
    Shipping,
    CheckoutButton,
}

impl std::fmt::Display for NotInitializedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotInitializedKind::Payment => write!(f, "payment"),
            NotInitializedKind::Customer => write!(f, "customer"),
            NotInitializedKind::Shipping => write!(f, "shipping"),
            NotInitializedKind::CheckoutButton => write!(f, "checkout button"),
        }
    }
}

/// Why a pending request was abandoned.
///
/// Supersession is reported through the timeout variant; there is no timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutReason {
    /// A newer request replaced this one before the vendor called back.
    Superseded,
    /// The holder went away before the vendor called back.
    Abandoned,
}

impl std::fmt::Display for TimeoutReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeoutReason::Superseded => write!(f, "was superseded by a newer request"),
            TimeoutReason::Abandoned => write!(f, "was abandoned before a response arrived"),
        }
    }
}

/// Failures surfaced by a vendor SDK.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VendorError {
    #[error("vendor script failed to load: {0}")]
    ScriptLoad(String),
    #[error("the browser is not supported by the payment provider")]
    UnsupportedBrowser,
    #[error("the wallet is not available")]
    WalletUnavailable,
    #[error("the shopper cancelled the wallet")]
    Cancelled,
    #[error("nonce generation failed: {0}")]
    NonceGeneration(String),
    #[error("vendor SDK error: {0}")]
    Sdk(String),
}

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("Configuration error: method \"{key}\" is already registered")]
    Configuration { key: String },
    #[error("Not found: no strategy registered for method \"{key}\"")]
    NotFound { key: String },
    #[error("Missing data: {0}")]
    MissingData(MissingDataKind),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Not initialized: {0} strategy has not been initialized")]
    NotInitialized(NotInitializedKind),
    #[error("Synchronization error: remote checkout state has not been established")]
    Synchronization,
    #[error("Timeout: request {reason}")]
    Timeout { reason: TimeoutReason },
    #[error("Vendor error: {0}")]
    Vendor(#[from] VendorError),
    #[error("Not implemented: {0}")]
    NotImplemented(String),
    #[error("Order finalization is not required for this payment method")]
    OrderFinalizationNotRequired,
    #[error("Unexpected callback: {0} fired without a pending request")]
    UnexpectedCallback(&'static str),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CheckoutError {
    /// True for errors raised by option validation before any vendor work.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CheckoutError::MissingData(_) | CheckoutError::InvalidArgument(_)
        )
    }

    /// True when the shopper dismissed a vendor dialog.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, CheckoutError::Vendor(VendorError::Cancelled))
    }

    pub fn is_superseded(&self) -> bool {
        matches!(
            self,
            CheckoutError::Timeout {
                reason: TimeoutReason::Superseded
            }
        )
    }

    pub(crate) fn superseded() -> Self {
        CheckoutError::Timeout {
            reason: TimeoutReason::Superseded,
        }
    }

    pub(crate) fn abandoned() -> Self {
        CheckoutError::Timeout {
            reason: TimeoutReason::Abandoned,
        }
    }

    pub(crate) fn missing_option(field: &'static str) -> Self {
        CheckoutError::MissingData(MissingDataKind::Options(field))
    }
}

pub type Result<T> = std::result::Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_option_names_field() {
        let error = CheckoutError::missing_option("containerId");
        assert!(error.is_validation());
        assert!(error.to_string().contains("containerId"));
    }

    #[test]
    fn test_superseded_is_timeout_shaped() {
        let error = CheckoutError::superseded();
        assert!(error.is_superseded());
        assert!(error.to_string().starts_with("Timeout"));
    }

    #[test]
    fn test_only_vendor_cancellation_is_cancellation() {
        assert!(CheckoutError::from(VendorError::Cancelled).is_cancellation());
        assert!(!CheckoutError::from(VendorError::WalletUnavailable).is_cancellation());
        assert!(!CheckoutError::Synchronization.is_cancellation());
    }
}
