mod common;

use checkout_strategies::application::registries::create_shipping_registry;
use checkout_strategies::domain::action::CheckoutAction;
use checkout_strategies::domain::method::MethodKey;
use checkout_strategies::domain::ports::CheckoutStore;
use checkout_strategies::domain::state::Address;
use checkout_strategies::error::CheckoutError;
use checkout_strategies::config::SandboxConfig;
use common::{sandbox, sandbox_with};
use std::sync::Arc;

#[tokio::test]
async fn test_registries_resolve_same_instance() {
    let sandbox = sandbox();

    let first = sandbox
        .registries
        .checkout_button
        .get(&MethodKey::from("googlepaybraintree"))
        .unwrap();
    let second = sandbox
        .registries
        .checkout_button
        .get(&MethodKey::GooglePayBraintree)
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_resolving_performs_no_io() {
    let sandbox = sandbox();

    sandbox.registries.payment.get(&MethodKey::GooglePay).unwrap();
    sandbox.registries.payment.get(&MethodKey::SquareV2).unwrap();
    sandbox
        .registries
        .customer
        .get(&MethodKey::GooglePayBraintree)
        .unwrap();

    assert!(sandbox.env.store.actions().is_empty());
    assert_eq!(sandbox.env.google_pay.load_count(), 0);
    assert_eq!(sandbox.env.square.form_count(), 0);
}

#[tokio::test]
async fn test_each_family_has_its_own_instances() {
    let sandbox = sandbox();

    let payment = sandbox.registries.payment.get(&MethodKey::GooglePay).unwrap();
    let braintree = sandbox
        .registries
        .payment
        .get(&MethodKey::GooglePayBraintree)
        .unwrap();

    assert!(!Arc::ptr_eq(&payment, &braintree));
}

#[tokio::test]
async fn test_unknown_key_is_not_found() {
    let sandbox = sandbox();

    let result = sandbox.registries.payment.get(&MethodKey::from("bitcoin"));
    match result {
        Err(CheckoutError::NotFound { key }) => assert_eq!(key, "bitcoin"),
        _ => panic!("expected NotFound"),
    }

    // No implicit fallback to the default key.
    assert!(sandbox
        .registries
        .customer
        .get(&MethodKey::Amazon)
        .is_err());
}

#[tokio::test]
async fn test_shipping_registry_rejects_duplicate_setup() {
    let sandbox = sandbox();
    let registry = create_shipping_registry(&sandbox.env.collaborators()).unwrap();

    let result = registry.register(MethodKey::Default, || unreachable!());
    assert!(matches!(result, Err(CheckoutError::Configuration { .. })));
}

#[tokio::test]
async fn test_shipping_runner_uses_default_without_provider() {
    let sandbox = sandbox();
    let runner = sandbox.registries.shipping_runner.clone();

    let address = Address {
        postal_code: "10001".to_string(),
        ..Default::default()
    };
    let state = runner.update_address(address.clone()).await.unwrap();
    assert_eq!(state.shipping_address, Some(address));

    let state = runner.select_option("ground".to_string()).await.unwrap();
    assert_eq!(state.shipping_option_id.as_deref(), Some("ground"));
}

#[tokio::test]
async fn test_shipping_runner_falls_back_for_unregistered_provider() {
    let sandbox = sandbox_with(SandboxConfig {
        payment_provider: Some("amazon".to_string()),
        shipping_address: Some(Address::default()),
        ..Default::default()
    });
    sandbox
        .env
        .store
        .dispatch(CheckoutAction::LoadCurrentCheckout)
        .await
        .unwrap();
    assert_eq!(sandbox.env.store.state().payment_provider_id(), Some("amazon"));

    let state = sandbox
        .registries
        .shipping_runner
        .select_option("express".to_string())
        .await
        .unwrap();
    assert_eq!(state.shipping_option_id.as_deref(), Some("express"));
}
