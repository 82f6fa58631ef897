use crate::error::{CheckoutError, Result};
use crate::interfaces::scenario::ScenarioStep;
use std::io::Read;

/// Reads scenario steps from a CSV source.
///
/// Whitespace is trimmed and the trailing `container` column may be omitted.
pub struct ScenarioReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ScenarioReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes steps, one `Result` per row.
    pub fn steps(self) -> impl Iterator<Item = Result<ScenarioStep>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(CheckoutError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::method::MethodKey;
    use crate::interfaces::scenario::{Family, Step};

    #[test]
    fn test_reader_valid_stream() {
        let data = "step, family, method, container\n\
                    initialize, checkout_button, googlepaybraintree, cart-button\n\
                    execute, payment, squarev2,";
        let steps: Vec<Result<ScenarioStep>> = ScenarioReader::new(data.as_bytes()).steps().collect();

        assert_eq!(steps.len(), 2);
        let first = steps[0].as_ref().unwrap();
        assert_eq!(first.step, Step::Initialize);
        assert_eq!(first.family, Family::CheckoutButton);
        assert_eq!(first.method, MethodKey::GooglePayBraintree);
        assert_eq!(first.container.as_deref(), Some("cart-button"));

        let second = steps[1].as_ref().unwrap();
        assert_eq!(second.container, None);
    }

    #[test]
    fn test_reader_missing_container_column() {
        let data = "step,family,method,container\nsign_out,customer,default";
        let steps: Vec<Result<ScenarioStep>> = ScenarioReader::new(data.as_bytes()).steps().collect();

        assert_eq!(steps[0].as_ref().unwrap().container, None);
    }

    #[test]
    fn test_reader_unknown_step() {
        let data = "step,family,method,container\nrefund,payment,googlepay,";
        let steps: Vec<Result<ScenarioStep>> = ScenarioReader::new(data.as_bytes()).steps().collect();

        assert!(steps[0].is_err());
    }
}
