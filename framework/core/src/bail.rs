/// Return this error from a scenario walk to indicate that the scenario is bailing.
///
/// This should be used when a scenario hits an error that is fatal to that scenario but not to the
/// run. For example, if the count endpoint rejects the scenario's filters then the scenario is
/// skipped and the run continues with the next scenario in the catalog.
#[derive(derive_more::Error, derive_more::Display, Debug)]
#[display("Scenario [{scenario}] is bailing: {reason}")]
pub struct ScenarioBailError {
    scenario: String,
    reason: String,
}

impl ScenarioBailError {
    pub fn new(scenario: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            reason: reason.into(),
        }
    }

    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_scenario_and_reason() {
        let err = ScenarioBailError::new("Popular Products (Cursor Pagination)", "HTTP 500");
        assert_eq!(
            err.to_string(),
            "Scenario [Popular Products (Cursor Pagination)] is bailing: HTTP 500"
        );
        assert_eq!(err.reason(), "HTTP 500");
    }

    #[test]
    fn bail_error_survives_anyhow_round_trip() {
        let err: anyhow::Error = ScenarioBailError::new("a", "b").into();
        assert!(err.is::<ScenarioBailError>());
    }
}
