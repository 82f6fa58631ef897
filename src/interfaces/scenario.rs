//! Replays scripted strategy calls against a sandbox environment.

use crate::application::registries::StrategyRegistries;
use crate::config::SandboxConfig;
use crate::domain::method::MethodKey;
use crate::domain::options::{
    CheckoutButtonInitializeOptions, CustomerInitializeOptions, GooglePayPaymentOptions,
    OrderPaymentRequestBody, OrderRequestBody, PaymentInitializeOptions, ShippingInitializeOptions,
    SquareFormElement, SquarePaymentOptions, WalletContainerOptions,
};
use crate::error::{CheckoutError, Result};
use crate::infrastructure::environment::SandboxEnvironment;
use crate::interfaces::csv::report_writer::ReportWriter;
use crate::interfaces::csv::scenario_reader::ScenarioReader;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Initialize,
    Deinitialize,
    Click,
    Execute,
    SignOut,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Initialize => "initialize",
            Step::Deinitialize => "deinitialize",
            Step::Click => "click",
            Step::Execute => "execute",
            Step::SignOut => "sign_out",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Payment,
    Customer,
    Shipping,
    CheckoutButton,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Family::Payment => "payment",
            Family::Customer => "customer",
            Family::Shipping => "shipping",
            Family::CheckoutButton => "checkout_button",
        };
        f.write_str(name)
    }
}

/// One scripted call. `container` doubles as the wallet button id for
/// payment strategies and as the click target for `click`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenarioStep {
    pub step: Step,
    pub family: Family,
    pub method: MethodKey,
    #[serde(default)]
    pub container: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub step: String,
    pub family: String,
    pub method: String,
    pub container: String,
    pub outcome: String,
}

pub struct ScenarioRunner {
    environment: SandboxEnvironment,
    registries: StrategyRegistries,
}

impl ScenarioRunner {
    pub fn new(config: &SandboxConfig) -> Result<Self> {
        let environment = SandboxEnvironment::new(config);
        let registries = environment.registries()?;
        Ok(Self {
            environment,
            registries,
        })
    }

    pub fn environment(&self) -> &SandboxEnvironment {
        &self.environment
    }

    pub fn registries(&self) -> &StrategyRegistries {
        &self.registries
    }

    /// Runs every step in order. A failing step is reported in its row and
    /// the run continues; only reading and writing errors stop it.
    pub async fn run<R: Read, W: Write>(&self, source: R, sink: W) -> Result<usize> {
        let mut report = ReportWriter::new(sink);
        let mut executed = 0;

        for step in ScenarioReader::new(source).steps() {
            let step = match step {
                Ok(step) => step,
                Err(error) => {
                    warn!(%error, "skipping unreadable scenario row");
                    continue;
                }
            };

            let outcome = match self.run_step(&step).await {
                Ok(outcome) => outcome,
                Err(error) => format!("error: {error}"),
            };
            report.write_row(&ReportRow {
                step: step.step.to_string(),
                family: step.family.to_string(),
                method: step.method.to_string(),
                container: step.container.clone().unwrap_or_default(),
                outcome,
            })?;
            executed += 1;
        }

        info!(executed, "scenario finished");
        Ok(executed)
    }

    pub async fn run_step(&self, step: &ScenarioStep) -> Result<String> {
        let method = &step.method;
        let container = step.container.clone();

        match (step.step, step.family) {
            (Step::Initialize, Family::Payment) => {
                let strategy = self.registries.payment.get(method)?;
                strategy
                    .initialize(payment_options(method, container))
                    .await?;
                Ok("initialized".to_string())
            }
            (Step::Initialize, Family::Customer) => {
                let strategy = self.registries.customer.get(method)?;
                strategy
                    .initialize(CustomerInitializeOptions {
                        method_id: Some(method.to_string()),
                        googlepaybraintree: container
                            .map(|container| WalletContainerOptions { container }),
                    })
                    .await?;
                Ok("initialized".to_string())
            }
            (Step::Initialize, Family::Shipping) => {
                let strategy = self.registries.shipping.get(method)?;
                strategy
                    .initialize(ShippingInitializeOptions {
                        method_id: Some(method.to_string()),
                    })
                    .await?;
                Ok("initialized".to_string())
            }
            (Step::Initialize, Family::CheckoutButton) => {
                let strategy = self.registries.checkout_button.get(method)?;
                strategy
                    .initialize(CheckoutButtonInitializeOptions {
                        method_id: Some(method.to_string()),
                        container_id: container,
                    })
                    .await?;
                Ok("initialized".to_string())
            }
            (Step::Deinitialize, Family::Payment) => {
                self.registries.payment.get(method)?.deinitialize().await?;
                Ok("deinitialized".to_string())
            }
            (Step::Deinitialize, Family::Customer) => {
                self.registries.customer.get(method)?.deinitialize().await?;
                Ok("deinitialized".to_string())
            }
            (Step::Deinitialize, Family::Shipping) => {
                self.registries.shipping.get(method)?.deinitialize().await?;
                Ok("deinitialized".to_string())
            }
            (Step::Deinitialize, Family::CheckoutButton) => {
                self.registries
                    .checkout_button
                    .get(method)?
                    .deinitialize(container.as_deref())
                    .await?;
                Ok("deinitialized".to_string())
            }
            (Step::Click, _) => {
                let target = container
                    .ok_or_else(|| CheckoutError::InvalidArgument("click needs a target".to_string()))?;
                let listeners = self.environment.document.click(&target).await?;
                Ok(format!("clicked {listeners}"))
            }
            (Step::Execute, Family::Payment) => {
                let state = self
                    .registries
                    .payment
                    .get(method)?
                    .execute(OrderRequestBody {
                        use_store_credit: false,
                        payment: Some(OrderPaymentRequestBody {
                            method_id: Some(method.to_string()),
                            payment_data: None,
                        }),
                    })
                    .await?;
                Ok(format!("order {}", state.order_id.unwrap_or_default()))
            }
            (Step::SignOut, Family::Customer) => {
                let state = self.registries.customer.get(method)?.sign_out().await?;
                Ok(match state.customer {
                    Some(customer) => format!("signed in as {}", customer.email),
                    None => "signed out".to_string(),
                })
            }
            (step, family) => Err(CheckoutError::InvalidArgument(format!(
                "{step} is not supported for {family} strategies"
            ))),
        }
    }
}

fn payment_options(method: &MethodKey, container: Option<String>) -> PaymentInitializeOptions {
    let mut options = PaymentInitializeOptions {
        method_id: Some(method.to_string()),
        ..Default::default()
    };

    match method {
        MethodKey::GooglePay | MethodKey::GooglePayBraintree => {
            options.googlepay = Some(GooglePayPaymentOptions {
                wallet_button: container,
            });
        }
        MethodKey::Square | MethodKey::SquareV2 => {
            let element = |id: &str| SquareFormElement {
                element_id: id.to_string(),
            };
            options.square = Some(SquarePaymentOptions {
                card_number: element("card-number"),
                cvv: element("card-cvv"),
                expiration_date: element("card-expiration"),
                postal_code: element("card-postal-code"),
                input_class: None,
            });
        }
        _ => {}
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(step: Step, family: Family, method: &str, container: Option<&str>) -> ScenarioStep {
        ScenarioStep {
            step,
            family,
            method: MethodKey::from(method),
            container: container.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_unsupported_combination_is_rejected() {
        let runner = ScenarioRunner::new(&SandboxConfig::default()).unwrap();
        let error = runner
            .run_step(&step(Step::Execute, Family::Shipping, "default", None))
            .await
            .unwrap_err();

        assert!(error.is_validation());
        assert!(error.to_string().contains("execute"));
    }

    #[tokio::test]
    async fn test_unknown_method_is_not_found() {
        let runner = ScenarioRunner::new(&SandboxConfig::default()).unwrap();
        let error = runner
            .run_step(&step(Step::Initialize, Family::Payment, "bitcoin", None))
            .await
            .unwrap_err();

        assert!(matches!(error, CheckoutError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_run_reports_failures_and_continues() {
        let runner = ScenarioRunner::new(&SandboxConfig::default()).unwrap();
        let scenario = "step,family,method,container\n\
                        initialize,checkout_button,googlepaybraintree,\n\
                        initialize,checkout_button,googlepaybraintree,cart-button\n";
        let mut output = Vec::new();

        let executed = runner.run(scenario.as_bytes(), &mut output).await.unwrap();
        let output = String::from_utf8(output).unwrap();

        assert_eq!(executed, 2);
        assert!(output.contains("containerId"));
        assert!(output.contains("initialize,checkout_button,googlepaybraintree,cart-button,initialized"));
    }

    #[test]
    fn test_square_options_name_every_field() {
        let options = payment_options(&MethodKey::SquareV2, None);
        let square = options.square.unwrap();
        assert_eq!(square.card_number.element_id, "card-number");
        assert!(options.googlepay.is_none());
    }
}
