//! Customer (sign-in) strategies.

mod default;
mod googlepay_braintree;

pub use default::DefaultCustomerStrategy;
pub use googlepay_braintree::GooglePayBraintreeCustomerStrategy;
