use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!());
    cmd.arg("tests/fixtures/scenario.csv");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("step,family,method,container,outcome"))
        .stdout(predicate::str::contains("containerId"))
        .stdout(predicate::str::contains(
            "initialize,checkout_button,googlepaybraintree,cart-button,initialized",
        ))
        .stdout(predicate::str::contains(
            "click,checkout_button,googlepaybraintree,cart-button,clicked 1",
        ))
        .stdout(predicate::str::contains("execute,payment,squarev2,,order order-1"))
        .stdout(predicate::str::contains("no strategy registered for method"))
        .stdout(predicate::str::contains("sign_out,customer,default,,signed out"))
        .stdout(predicate::str::contains(
            "deinitialize,checkout_button,googlepaybraintree,,deinitialized",
        ));

    Ok(())
}

#[test]
fn test_cli_with_config_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = tempfile::NamedTempFile::new()?;
    write!(config, r#"{{ "google_pay": {{ "ready_to_pay": false }} }}"#)?;

    let mut cmd = Command::new(cargo_bin!());
    cmd.arg("tests/fixtures/scenario.csv")
        .arg("--config")
        .arg(config.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("the wallet is not available"));

    Ok(())
}

#[test]
fn test_cli_missing_scenario_fails() {
    let mut cmd = Command::new(cargo_bin!());
    cmd.arg("tests/fixtures/does-not-exist.csv");

    cmd.assert().failure();
}

#[test]
fn test_cli_bad_config_fails() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = tempfile::NamedTempFile::new()?;
    write!(config, "not json")?;

    let mut cmd = Command::new(cargo_bin!());
    cmd.arg("tests/fixtures/scenario.csv")
        .arg("--config")
        .arg(config.path());

    cmd.assert().failure();

    Ok(())
}
