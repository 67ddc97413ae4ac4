//! Interactive lab session: the caller-side state around the engine.
//!
//! The engine and explainer are stateless. A [`LabSession`] holds the current
//! rates and a single-slot memory of the last result. Every edit recomputes,
//! explains against the remembered result, and only then overwrites it.

use bl_common::{Error, Parameter, RateInputs, Result, SessionId};
use bl_config::ScenarioCatalog;
use schemars::JsonSchema;
use serde::Serialize;

use crate::inference::{
    compute_with_population, explain_change_detailed, ChangeExplanation, ExplainOptions,
    PosteriorResult,
};

/// A single user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    /// Move one rate to a new value (percent).
    Set(Parameter, f64),
    /// Load all three rates from a named scenario.
    Scenario(String),
    /// Restore the starting rates and forget the previous result.
    Reset,
}

/// One line of lab input.
#[derive(Debug, Clone, PartialEq)]
pub enum LabCommand {
    Edit(Edit),
    /// Recompute without changing anything.
    Show,
    Quit,
    /// Blank line or `#` comment.
    Noop,
}

/// Parse a lab input line.
///
/// Accepted forms: `prevalence=V` (any parameter alias, `=` or whitespace),
/// `scenario NAME`, `show`, `reset`, `quit`/`exit`.
pub fn parse_command(line: &str) -> Result<LabCommand> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(LabCommand::Noop);
    }

    let lower = line.to_ascii_lowercase();
    match lower.as_str() {
        "quit" | "exit" | "q" => return Ok(LabCommand::Quit),
        "reset" => return Ok(LabCommand::Edit(Edit::Reset)),
        "show" => return Ok(LabCommand::Show),
        _ => {}
    }

    if let Some(rest) = lower
        .strip_prefix("scenario")
        .filter(|r| r.starts_with(char::is_whitespace))
    {
        let name = line[line.len() - rest.len()..].trim();
        if name.is_empty() {
            return Err(Error::InvalidArgument("scenario requires a name".to_string()));
        }
        return Ok(LabCommand::Edit(Edit::Scenario(name.to_string())));
    }

    let (key, value) = line
        .split_once('=')
        .or_else(|| line.split_once(char::is_whitespace))
        .ok_or_else(|| Error::InvalidArgument(format!("unrecognized command: {}", line)))?;

    let parameter = Parameter::parse(key)
        .ok_or_else(|| Error::InvalidArgument(format!("unknown parameter: {}", key.trim())))?;
    let value: f64 = value.trim().parse().map_err(|_| {
        Error::InvalidArgument(format!("invalid {} value: {}", parameter, value.trim()))
    })?;

    Ok(LabCommand::Edit(Edit::Set(parameter, value)))
}

/// Outcome of one lab step.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct LabStep {
    pub step: u64,
    pub inputs: RateInputs,
    /// Scenario the current rates started from, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight: Option<String>,
    pub result: PosteriorResult,
    pub explanation: ChangeExplanation,
}

/// Caller-held state for a sequence of recomputations.
#[derive(Debug, Clone)]
pub struct LabSession {
    id: SessionId,
    catalog: ScenarioCatalog,
    population: f64,
    options: ExplainOptions,
    initial: RateInputs,
    initial_scenario: Option<String>,
    inputs: RateInputs,
    scenario: Option<String>,
    previous: Option<PosteriorResult>,
    steps: u64,
}

impl LabSession {
    pub fn new(
        catalog: ScenarioCatalog,
        initial: RateInputs,
        population: f64,
        options: ExplainOptions,
    ) -> Result<Self> {
        check_rates(&initial)?;
        Ok(Self {
            id: SessionId::new(),
            catalog,
            population,
            options,
            initial,
            initial_scenario: None,
            inputs: initial,
            scenario: None,
            previous: None,
            steps: 0,
        })
    }

    /// Start from a named scenario in `catalog`.
    pub fn from_scenario(
        catalog: ScenarioCatalog,
        name: &str,
        population: f64,
        options: ExplainOptions,
    ) -> Result<Self> {
        let scenario = catalog
            .find(name)
            .cloned()
            .ok_or_else(|| Error::ScenarioNotFound {
                name: name.to_string(),
            })?;
        let mut session = Self::new(catalog, scenario.inputs(), population, options)?;
        session.initial_scenario = Some(scenario.name.clone());
        session.scenario = Some(scenario.name);
        Ok(session)
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn inputs(&self) -> RateInputs {
        self.inputs
    }

    pub fn scenario(&self) -> Option<&str> {
        self.scenario.as_deref()
    }

    /// The remembered result from the last step.
    pub fn previous(&self) -> Option<&PosteriorResult> {
        self.previous.as_ref()
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn catalog(&self) -> &ScenarioCatalog {
        &self.catalog
    }

    /// Apply an edit, recompute, and explain against the previous result.
    ///
    /// A rejected edit leaves the session untouched.
    pub fn apply(&mut self, edit: Edit) -> Result<LabStep> {
        match edit {
            Edit::Set(parameter, value) => {
                let next = self.inputs.with(parameter, value);
                check_rates(&next)?;
                self.inputs = next;
            }
            Edit::Scenario(name) => {
                let scenario = self
                    .catalog
                    .find(&name)
                    .ok_or(Error::ScenarioNotFound { name })?;
                self.inputs = scenario.inputs();
                self.scenario = Some(scenario.name.clone());
            }
            Edit::Reset => {
                self.inputs = self.initial;
                self.scenario = self.initial_scenario.clone();
                self.previous = None;
            }
        }
        Ok(self.observe())
    }

    /// Recompute the current rates and advance the memory slot.
    pub fn observe(&mut self) -> LabStep {
        let result = compute_with_population(self.inputs, self.population);
        let explanation = explain_change_detailed(self.previous.as_ref(), &result, &self.options);
        self.previous = Some(result);
        self.steps += 1;

        let insight = self
            .scenario
            .as_deref()
            .and_then(|name| self.catalog.find(name))
            .map(|s| s.insight.clone())
            .filter(|i| !i.is_empty());

        LabStep {
            step: self.steps,
            inputs: self.inputs,
            scenario: self.scenario.clone(),
            insight,
            result,
            explanation,
        }
    }
}

fn check_rates(inputs: &RateInputs) -> Result<()> {
    match inputs.first_out_of_range() {
        Some((parameter, value)) => Err(Error::InvalidRate { parameter, value }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{PosteriorShift, ONBOARDING_MESSAGE};

    fn session() -> LabSession {
        LabSession::from_scenario(
            ScenarioCatalog::builtin(),
            "Rare disease screening",
            1000.0,
            ExplainOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn first_observation_is_onboarding() {
        let mut lab = session();
        let step = lab.observe();
        assert_eq!(step.step, 1);
        assert_eq!(step.explanation.text, ONBOARDING_MESSAGE);
        assert_eq!(
            step.insight.as_deref(),
            Some("Rare condition + imperfect specificity can produce many false positives.")
        );
        assert!(lab.previous().is_some());
    }

    #[test]
    fn edit_explains_against_previous() {
        let mut lab = session();
        lab.observe();
        let step = lab.apply(Edit::Set(Parameter::Prevalence, 10.0)).unwrap();
        assert!(step.explanation.text.starts_with("You changed prevalence (base rate)."));
        assert!(matches!(
            step.explanation.shift,
            Some(PosteriorShift::Increased { .. })
        ));
        // Scenario label survives manual edits.
        assert_eq!(step.scenario.as_deref(), Some("Rare disease screening"));
    }

    #[test]
    fn store_after_read() {
        let mut lab = session();
        lab.observe();
        lab.apply(Edit::Set(Parameter::Specificity, 99.0)).unwrap();
        let again = lab.apply(Edit::Set(Parameter::Specificity, 99.0)).unwrap();
        assert_eq!(again.explanation.text, "Posterior stayed nearly unchanged.");
        assert_eq!(lab.previous().map(|r| r.posterior), Some(again.result.posterior));
    }

    #[test]
    fn scenario_switch_names_all_changes() {
        let mut lab = session();
        lab.observe();
        let step = lab.apply(Edit::Scenario("specialist clinic".into())).unwrap();
        assert_eq!(step.scenario.as_deref(), Some("Specialist clinic"));
        assert_eq!(step.explanation.changes.len(), 3);
    }

    #[test]
    fn rejected_edit_leaves_state() {
        let mut lab = session();
        lab.observe();
        let before = lab.inputs();
        let err = lab.apply(Edit::Set(Parameter::Sensitivity, 140.0)).unwrap_err();
        assert_eq!(err.code(), 20);
        assert_eq!(lab.inputs(), before);
        assert_eq!(lab.steps(), 1);

        let err = lab.apply(Edit::Scenario("Coin flip".into())).unwrap_err();
        assert_eq!(err.code(), 30);
    }

    #[test]
    fn reset_forgets_previous() {
        let mut lab = session();
        lab.observe();
        lab.apply(Edit::Set(Parameter::Prevalence, 50.0)).unwrap();
        let step = lab.apply(Edit::Reset).unwrap();
        assert_eq!(step.inputs, RateInputs::new(1.0, 95.0, 95.0));
        assert_eq!(step.explanation.text, ONBOARDING_MESSAGE);
    }

    #[test]
    fn unknown_start_scenario() {
        let err = LabSession::from_scenario(
            ScenarioCatalog::builtin(),
            "nope",
            1000.0,
            ExplainOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ScenarioNotFound { .. }));
    }

    #[test]
    fn parse_commands() {
        assert_eq!(
            parse_command("prevalence=5").unwrap(),
            LabCommand::Edit(Edit::Set(Parameter::Prevalence, 5.0))
        );
        assert_eq!(
            parse_command("  spec 97.5 ").unwrap(),
            LabCommand::Edit(Edit::Set(Parameter::Specificity, 97.5))
        );
        assert_eq!(
            parse_command("scenario Fraud detection").unwrap(),
            LabCommand::Edit(Edit::Scenario("Fraud detection".into()))
        );
        assert_eq!(parse_command("RESET").unwrap(), LabCommand::Edit(Edit::Reset));
        assert_eq!(parse_command("quit").unwrap(), LabCommand::Quit);
        assert_eq!(parse_command("show").unwrap(), LabCommand::Show);
        assert_eq!(parse_command("").unwrap(), LabCommand::Noop);
        assert_eq!(parse_command("# note").unwrap(), LabCommand::Noop);
    }

    #[test]
    fn parse_command_errors() {
        assert!(parse_command("accuracy=5").is_err());
        assert!(parse_command("sensitivity=high").is_err());
        assert!(parse_command("scenario   ").is_err());
        assert!(parse_command("jump").is_err());
    }
}
