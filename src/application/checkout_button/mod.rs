//! Wallet buttons rendered outside the checkout page, such as on the cart.

mod googlepay_braintree;

pub use googlepay_braintree::GooglePayBraintreeButtonStrategy;
