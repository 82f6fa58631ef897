//! Payment strategies.

mod googlepay;
mod square;

pub use googlepay::GooglePayPaymentStrategy;
pub use square::SquarePaymentStrategy;
