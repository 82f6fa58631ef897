#![allow(dead_code)]

use checkout_strategies::application::registries::StrategyRegistries;
use checkout_strategies::config::SandboxConfig;
use checkout_strategies::domain::options::{
    CheckoutButtonInitializeOptions, CustomerInitializeOptions, GooglePayPaymentOptions,
    OrderPaymentRequestBody, OrderRequestBody, PaymentInitializeOptions, SquareFormElement,
    SquarePaymentOptions, WalletContainerOptions,
};
use checkout_strategies::infrastructure::environment::SandboxEnvironment;

pub struct Sandbox {
    pub env: SandboxEnvironment,
    pub registries: StrategyRegistries,
}

pub fn sandbox() -> Sandbox {
    sandbox_with(SandboxConfig::default())
}

pub fn sandbox_with(config: SandboxConfig) -> Sandbox {
    let env = SandboxEnvironment::new(&config);
    let registries = env.registries().expect("sandbox registries");
    Sandbox { env, registries }
}

pub fn button_options(method_id: &str, container_id: Option<&str>) -> CheckoutButtonInitializeOptions {
    CheckoutButtonInitializeOptions {
        method_id: Some(method_id.to_string()),
        container_id: container_id.map(String::from),
    }
}

pub fn customer_options(container: &str) -> CustomerInitializeOptions {
    CustomerInitializeOptions {
        method_id: Some("googlepaybraintree".to_string()),
        googlepaybraintree: Some(WalletContainerOptions {
            container: container.to_string(),
        }),
    }
}

pub fn googlepay_options(method_id: &str, wallet_button: Option<&str>) -> PaymentInitializeOptions {
    PaymentInitializeOptions {
        method_id: Some(method_id.to_string()),
        googlepay: Some(GooglePayPaymentOptions {
            wallet_button: wallet_button.map(String::from),
        }),
        square: None,
    }
}

pub fn square_options() -> PaymentInitializeOptions {
    let element = |id: &str| SquareFormElement {
        element_id: id.to_string(),
    };
    PaymentInitializeOptions {
        method_id: Some("squarev2".to_string()),
        googlepay: None,
        square: Some(SquarePaymentOptions {
            card_number: element("card-number"),
            cvv: element("card-cvv"),
            expiration_date: element("card-expiration"),
            postal_code: element("card-postal-code"),
            input_class: Some("form-input".to_string()),
        }),
    }
}

pub fn order_for(method_id: &str) -> OrderRequestBody {
    OrderRequestBody {
        use_store_credit: false,
        payment: Some(OrderPaymentRequestBody {
            method_id: Some(method_id.to_string()),
            payment_data: None,
        }),
    }
}
