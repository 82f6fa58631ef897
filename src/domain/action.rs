use super::options::{CustomerCredentials, OrderRequestBody, PaymentPayload};
use super::state::Address;

/// A store-mutating request a strategy hands to [`CheckoutStore::dispatch`].
///
/// [`CheckoutStore::dispatch`]: super::ports::CheckoutStore::dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutAction {
    LoadCurrentCheckout,
    LoadDefaultCheckout,
    LoadPaymentMethod { method_id: String },
    UpdateBillingAddress { id: String, address: Address },
    UpdateShippingAddress { address: Address },
    SelectShippingOption { option_id: String },
    SignInCustomer(CustomerCredentials),
    SignOutCustomer,
    RemoteSignOut { provider_id: String },
    SubmitOrder(OrderRequestBody),
    SubmitPayment(PaymentPayload),
}

impl CheckoutAction {
    /// Short stable label used in logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            CheckoutAction::LoadCurrentCheckout => "load_current_checkout",
            CheckoutAction::LoadDefaultCheckout => "load_default_checkout",
            CheckoutAction::LoadPaymentMethod { .. } => "load_payment_method",
            CheckoutAction::UpdateBillingAddress { .. } => "update_billing_address",
            CheckoutAction::UpdateShippingAddress { .. } => "update_shipping_address",
            CheckoutAction::SelectShippingOption { .. } => "select_shipping_option",
            CheckoutAction::SignInCustomer(_) => "sign_in_customer",
            CheckoutAction::SignOutCustomer => "sign_out_customer",
            CheckoutAction::RemoteSignOut { .. } => "remote_sign_out",
            CheckoutAction::SubmitOrder(_) => "submit_order",
            CheckoutAction::SubmitPayment(_) => "submit_payment",
        }
    }
}
