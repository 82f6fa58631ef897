use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies a payment, customer, shipping or button method.
///
/// Known vendor ids get their own variant; anything else is carried verbatim
/// in `Other` so extensions can register without touching this enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MethodKey {
    Amazon,
    BraintreePaypal,
    BraintreePaypalCredit,
    BraintreeVisaCheckout,
    ChasePay,
    GooglePay,
    GooglePayBraintree,
    Masterpass,
    Square,
    SquareV2,
    Default,
    Other(String),
}

impl MethodKey {
    pub fn as_str(&self) -> &str {
        match self {
            MethodKey::Amazon => "amazon",
            MethodKey::BraintreePaypal => "braintreepaypal",
            MethodKey::BraintreePaypalCredit => "braintreepaypalcredit",
            MethodKey::BraintreeVisaCheckout => "braintreevisacheckout",
            MethodKey::ChasePay => "chasepay",
            MethodKey::GooglePay => "googlepay",
            MethodKey::GooglePayBraintree => "googlepaybraintree",
            MethodKey::Masterpass => "masterpass",
            MethodKey::Square => "square",
            MethodKey::SquareV2 => "squarev2",
            MethodKey::Default => "default",
            MethodKey::Other(key) => key,
        }
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for MethodKey {
    fn from(value: &str) -> Self {
        match value {
            "amazon" => MethodKey::Amazon,
            "braintreepaypal" => MethodKey::BraintreePaypal,
            "braintreepaypalcredit" => MethodKey::BraintreePaypalCredit,
            "braintreevisacheckout" => MethodKey::BraintreeVisaCheckout,
            "chasepay" => MethodKey::ChasePay,
            "googlepay" => MethodKey::GooglePay,
            "googlepaybraintree" => MethodKey::GooglePayBraintree,
            "masterpass" => MethodKey::Masterpass,
            "square" => MethodKey::Square,
            "squarev2" => MethodKey::SquareV2,
            "default" => MethodKey::Default,
            other => MethodKey::Other(other.to_string()),
        }
    }
}

impl From<String> for MethodKey {
    fn from(value: String) -> Self {
        MethodKey::from(value.as_str())
    }
}

impl From<MethodKey> for String {
    fn from(key: MethodKey) -> Self {
        key.as_str().to_string()
    }
}

impl FromStr for MethodKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(MethodKey::from(s))
    }
}
