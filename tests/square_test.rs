mod common;

use checkout_strategies::config::{SandboxConfig, SquareSandboxConfig};
use checkout_strategies::domain::method::MethodKey;
use checkout_strategies::domain::ports::CheckoutStore;
use checkout_strategies::domain::options::{
    NonceInstrument, OrderPaymentRequestBody, OrderRequestBody, PaymentInstrument,
};
use checkout_strategies::domain::vendor::{CardNonceResponse, DigitalWalletType};
use checkout_strategies::error::{CheckoutError, MissingDataKind, TimeoutReason, VendorError};
use common::{order_for, sandbox, sandbox_with, square_options};
use std::time::Duration;

fn unanswered() -> SandboxConfig {
    SandboxConfig {
        square: SquareSandboxConfig {
            respond_to_nonce_requests: false,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn nonce(value: &str) -> CardNonceResponse {
    CardNonceResponse {
        nonce: Some(value.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_square_initialize_then_execute() {
    let sandbox = sandbox();
    let strategy = sandbox.registries.payment.get(&MethodKey::SquareV2).unwrap();

    strategy.initialize(square_options()).await.unwrap();
    strategy.initialize(square_options()).await.unwrap();
    assert_eq!(sandbox.env.square.form_count(), 1);

    let form = sandbox.env.square.latest_form().unwrap();
    assert_eq!(form.application_id(), Some("sandbox-sq0idp"));
    assert_eq!(form.postal_code().as_deref(), Some("94105"));

    let state = strategy.execute(order_for("squarev2")).await.unwrap();
    assert_eq!(state.order_id.as_deref(), Some("order-1"));
    assert_eq!(form.nonce_request_count(), 1);
}

#[tokio::test]
async fn test_square_execute_with_nonce_skips_form() {
    let sandbox = sandbox();
    let strategy = sandbox.registries.payment.get(&MethodKey::SquareV2).unwrap();
    strategy.initialize(square_options()).await.unwrap();

    let payload = OrderRequestBody {
        use_store_credit: false,
        payment: Some(OrderPaymentRequestBody {
            method_id: Some("squarev2".to_string()),
            payment_data: Some(PaymentInstrument::Nonce(NonceInstrument {
                nonce: "cnon:given".to_string(),
            })),
        }),
    };
    strategy.execute(payload).await.unwrap();

    let form = sandbox.env.square.latest_form().unwrap();
    assert_eq!(form.nonce_request_count(), 0);
}

#[tokio::test]
async fn test_square_execute_requires_method() {
    let sandbox = sandbox();
    let strategy = sandbox.registries.payment.get(&MethodKey::SquareV2).unwrap();
    strategy.initialize(square_options()).await.unwrap();

    let error = strategy
        .execute(OrderRequestBody::default())
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        CheckoutError::MissingData(MissingDataKind::PaymentMethod)
    ));
}

#[tokio::test]
async fn test_second_nonce_request_supersedes_first() {
    let sandbox = sandbox_with(unanswered());
    let strategy = sandbox.registries.payment.get(&MethodKey::SquareV2).unwrap();
    strategy.initialize(square_options()).await.unwrap();
    let form = sandbox.env.square.latest_form().unwrap();

    let first = tokio::spawn({
        let strategy = strategy.clone();
        async move { strategy.execute(order_for("squarev2")).await }
    });
    while form.nonce_request_count() < 1 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    let second = tokio::spawn({
        let strategy = strategy.clone();
        async move { strategy.execute(order_for("squarev2")).await }
    });
    let first = first.await.unwrap();
    assert!(first.unwrap_err().is_superseded());

    while form.nonce_request_count() < 2 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    form.respond(nonce("cnon:second")).await.unwrap();

    let state = second.await.unwrap().unwrap();
    assert_eq!(state.order_id.as_deref(), Some("order-1"));
}

#[tokio::test]
async fn test_nonce_errors_reject_execute() {
    let sandbox = sandbox_with(SandboxConfig {
        square: SquareSandboxConfig {
            nonce_errors: vec!["Card number is invalid".to_string(), "CVV is missing".to_string()],
            ..Default::default()
        },
        ..Default::default()
    });
    let strategy = sandbox.registries.payment.get(&MethodKey::SquareV2).unwrap();
    strategy.initialize(square_options()).await.unwrap();

    let error = strategy.execute(order_for("squarev2")).await.unwrap_err();
    match error {
        CheckoutError::Vendor(VendorError::NonceGeneration(message)) => {
            assert_eq!(message, "Card number is invalid, CVV is missing");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(sandbox.env.store.state().order_id.is_none());
}

#[tokio::test]
async fn test_unsupported_browser_fails_initialize() {
    let sandbox = sandbox_with(SandboxConfig {
        square: SquareSandboxConfig {
            unsupported_browser: true,
            ..Default::default()
        },
        ..Default::default()
    });
    let strategy = sandbox.registries.payment.get(&MethodKey::SquareV2).unwrap();

    let error = strategy.initialize(square_options()).await.unwrap_err();
    assert!(matches!(
        error,
        CheckoutError::Vendor(VendorError::UnsupportedBrowser)
    ));

    let error = strategy.execute(order_for("squarev2")).await.unwrap_err();
    assert!(matches!(error, CheckoutError::NotInitialized(_)));
}

#[tokio::test]
async fn test_late_callback_after_deinitialize_is_dropped() {
    let sandbox = sandbox_with(unanswered());
    let strategy = sandbox.registries.payment.get(&MethodKey::SquareV2).unwrap();
    strategy.initialize(square_options()).await.unwrap();
    let form = sandbox.env.square.latest_form().unwrap();

    let pending = tokio::spawn({
        let strategy = strategy.clone();
        async move { strategy.execute(order_for("squarev2")).await }
    });
    while form.nonce_request_count() < 1 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    strategy.deinitialize().await.unwrap();
    let error = pending.await.unwrap().unwrap_err();
    assert!(matches!(error, CheckoutError::Timeout { .. }));

    form.respond(nonce("cnon:late")).await.unwrap();
    assert!(sandbox.env.store.state().order_id.is_none());
}

#[tokio::test]
async fn test_unexpected_nonce_is_reported() {
    let sandbox = sandbox();
    let strategy = sandbox.registries.payment.get(&MethodKey::SquareV2).unwrap();
    strategy.initialize(square_options()).await.unwrap();
    let form = sandbox.env.square.latest_form().unwrap();

    let error = form.respond(nonce("cnon:stray")).await.unwrap_err();
    assert!(matches!(error, CheckoutError::UnexpectedCallback(_)));
}

#[tokio::test]
async fn test_digital_wallet_posts_external_checkout() {
    let sandbox = sandbox();
    let strategy = sandbox.registries.payment.get(&MethodKey::SquareV2).unwrap();
    strategy.initialize(square_options()).await.unwrap();
    let form = sandbox.env.square.latest_form().unwrap();

    form.complete_digital_wallet(DigitalWalletType::Masterpass)
        .await
        .unwrap();

    let requests = sandbox.env.store.requests();
    assert_eq!(requests.len(), 1);
    let body = &requests[0].1.body;
    assert_eq!(body["provider"], "squarev2");
    assert_eq!(body["nonce"], "cnon:sandbox-wallet");
    assert!(body["cardData"].contains("Masterpass"));

    let state = sandbox.env.store.state();
    assert_eq!(state.payment_provider_id(), Some("squarev2"));
    let method = state.payment_method("squarev2").unwrap();
    assert_eq!(
        method.initialization_data.nonce.as_deref(),
        Some("cnon:sandbox-wallet")
    );
}

#[tokio::test]
async fn test_deinitialize_while_form_never_loads() {
    let sandbox = sandbox_with(SandboxConfig {
        square: SquareSandboxConfig {
            form_never_loads: true,
            ..Default::default()
        },
        ..Default::default()
    });
    let strategy = sandbox.registries.payment.get(&MethodKey::SquareV2).unwrap();

    let pending = tokio::spawn({
        let strategy = strategy.clone();
        async move { strategy.initialize(square_options()).await }
    });
    while sandbox.env.square.form_count() < 1 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    tokio::time::timeout(Duration::from_secs(1), strategy.deinitialize())
        .await
        .expect("deinitialize waited on the stalled form")
        .unwrap();

    let error = pending.await.unwrap().unwrap_err();
    assert!(matches!(
        error,
        CheckoutError::Timeout {
            reason: TimeoutReason::Abandoned
        }
    ));
    let error = strategy.execute(order_for("squarev2")).await.unwrap_err();
    assert!(matches!(error, CheckoutError::NotInitialized(_)));
}
