//! Command output rendering.
//!
//! Each command builds a report value; [`render`] turns it into the text for
//! the selected [`OutputFormat`]. JSON output is wrapped in an envelope with
//! `schema_version`, `session_id`, `generated_at` and `command`.
//! `exitcode` renders nothing.

use bl_common::{OutputFormat, Parameter, RateInputs, SessionId, SCHEMA_VERSION};
use bl_config::{ConfigSnapshot, Scenario};
use bl_math::format_percent;
use serde::Serialize;
use serde_json::{json, Value};

use crate::inference::{
    compute_with_population, explain_change_detailed, ChangeExplanation, EvidenceSummary,
    ExplainOptions, PosteriorResult, RoundedFrequencies, SweepPoint,
};
use crate::lab::LabStep;

/// Something a command can print in every output format.
pub trait Report: Serialize {
    /// Command name used in the JSON envelope and summaries.
    fn command(&self) -> &'static str;

    /// One line, no trailing newline.
    fn summary(&self) -> String;

    fn markdown(&self) -> String;

    /// Plain-language narrative.
    fn prose(&self) -> String;
}

/// Wrap a report body in the standard JSON envelope.
pub fn envelope<R: Report>(report: &R, session_id: &SessionId) -> Value {
    let mut value = json!({
        "schema_version": SCHEMA_VERSION,
        "session_id": session_id.0,
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "command": report.command(),
    });
    if let (Some(obj), Ok(Value::Object(body))) =
        (value.as_object_mut(), serde_json::to_value(report))
    {
        obj.extend(body);
    }
    value
}

/// Render `report` in `format`. None means print nothing.
pub fn render<R: Report>(
    report: &R,
    format: OutputFormat,
    session_id: &SessionId,
) -> Option<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&envelope(report, session_id)).ok(),
        OutputFormat::Jsonl => serde_json::to_string(&envelope(report, session_id)).ok(),
        OutputFormat::Md => Some(report.markdown()),
        OutputFormat::Summary => Some(format!(
            "[{}] {}: {}",
            session_id,
            report.command(),
            report.summary()
        )),
        OutputFormat::Prose => Some(report.prose()),
        OutputFormat::Exitcode => None,
    }
}

fn rates_line(inputs: &RateInputs) -> String {
    format!(
        "prevalence {}%, sensitivity {}%, specificity {}%",
        inputs.prevalence, inputs.sensitivity, inputs.specificity
    )
}

fn frequency_table(result: &PosteriorResult) -> String {
    let r = result.rounded();
    let mut out = String::new();
    out.push_str(&format!("Out of {} people:\n\n", result.population));
    out.push_str("| | Test positive | Test negative | Total |\n");
    out.push_str("|---|---:|---:|---:|\n");
    out.push_str(&format!(
        "| Condition | {} | {} | {} |\n",
        r.true_positive, r.false_negative, r.diseased
    ));
    out.push_str(&format!(
        "| No condition | {} | {} | {} |\n",
        r.false_positive, r.true_negative, r.healthy
    ));
    out
}

// ============================================================================
// compute / scenarios show
// ============================================================================

/// One posterior computation with its presentation extras.
#[derive(Debug, Clone, Serialize)]
pub struct ComputeReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight: Option<String>,
    pub inputs: RateInputs,
    pub result: PosteriorResult,
    pub rounded: RoundedFrequencies,
    pub evidence: EvidenceSummary,
}

impl ComputeReport {
    pub fn new(inputs: RateInputs, population: f64) -> Self {
        let result = compute_with_population(inputs, population);
        Self {
            scenario: None,
            insight: None,
            inputs,
            rounded: result.rounded(),
            evidence: EvidenceSummary::from_result(&result),
            result,
        }
    }

    pub fn with_scenario(mut self, scenario: &Scenario) -> Self {
        self.scenario = Some(scenario.name.clone());
        if !scenario.insight.is_empty() {
            self.insight = Some(scenario.insight.clone());
        }
        self
    }
}

impl Report for ComputeReport {
    fn command(&self) -> &'static str {
        "compute"
    }

    fn summary(&self) -> String {
        let r = &self.rounded;
        format!(
            "P(D|+) = {} (TP {}, FP {})",
            format_percent(self.result.posterior),
            r.true_positive,
            r.false_positive
        )
    }

    fn markdown(&self) -> String {
        let mut out = String::new();
        match &self.scenario {
            Some(name) => out.push_str(&format!("# {}\n\n", name)),
            None => out.push_str("# Posterior\n\n"),
        }
        out.push_str(&format!("Inputs: {}\n\n", rates_line(&self.inputs)));
        out.push_str(&format!(
            "**P(D|+) = {}**\n\n",
            format_percent(self.result.posterior)
        ));
        out.push_str(&frequency_table(&self.result));
        out.push('\n');
        out.push_str(&self.evidence.describe());
        out.push('\n');
        if let Some(insight) = &self.insight {
            out.push_str(&format!("\n> {}\n", insight));
        }
        out
    }

    fn prose(&self) -> String {
        let mut out = format!(
            "Out of {} people, {} The chance of having the condition after a positive test is {}.",
            self.result.population,
            self.result.natural_frequency_sentence(),
            format_percent(self.result.posterior)
        );
        if let Some(insight) = &self.insight {
            out.push(' ');
            out.push_str(insight);
        }
        out
    }
}

// ============================================================================
// explain
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ExplainReport {
    pub from: RateInputs,
    pub to: RateInputs,
    pub previous: PosteriorResult,
    pub current: PosteriorResult,
    pub explanation: ChangeExplanation,
}

impl ExplainReport {
    pub fn new(
        from: RateInputs,
        to: RateInputs,
        population: f64,
        options: &ExplainOptions,
    ) -> Self {
        let previous = compute_with_population(from, population);
        let current = compute_with_population(to, population);
        let explanation = explain_change_detailed(Some(&previous), &current, options);
        Self {
            from,
            to,
            previous,
            current,
            explanation,
        }
    }
}

impl Report for ExplainReport {
    fn command(&self) -> &'static str {
        "explain"
    }

    fn summary(&self) -> String {
        format!(
            "{} -> {}: {}",
            format_percent(self.previous.posterior),
            format_percent(self.current.posterior),
            self.explanation.text
        )
    }

    fn markdown(&self) -> String {
        let mut out = String::from("# Change explanation\n\n");
        out.push_str("| | Before | After |\n|---|---:|---:|\n");
        for parameter in Parameter::ALL {
            let marker = if self.explanation.changes.contains(parameter) {
                " *"
            } else {
                ""
            };
            out.push_str(&format!(
                "| {}{} | {}% | {}% |\n",
                parameter,
                marker,
                self.from.get(parameter),
                self.to.get(parameter)
            ));
        }
        out.push_str(&format!(
            "| posterior | {} | {} |\n\n",
            format_percent(self.previous.posterior),
            format_percent(self.current.posterior)
        ));
        out.push_str(&self.explanation.text);
        out.push('\n');
        out
    }

    fn prose(&self) -> String {
        self.explanation.text.clone()
    }
}

// ============================================================================
// scenarios list
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioEntry {
    #[serde(flatten)]
    pub scenario: Scenario,
    pub posterior: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioListReport {
    pub scenarios: Vec<ScenarioEntry>,
}

impl ScenarioListReport {
    pub fn new(scenarios: &[Scenario], population: f64) -> Self {
        let scenarios = scenarios
            .iter()
            .map(|s| ScenarioEntry {
                posterior: compute_with_population(s.inputs(), population).posterior,
                scenario: s.clone(),
            })
            .collect();
        Self { scenarios }
    }
}

impl Report for ScenarioListReport {
    fn command(&self) -> &'static str {
        "scenarios"
    }

    fn summary(&self) -> String {
        let names: Vec<&str> = self
            .scenarios
            .iter()
            .map(|e| e.scenario.name.as_str())
            .collect();
        format!("{} scenarios ({})", names.len(), names.join(", "))
    }

    fn markdown(&self) -> String {
        let mut out = String::from("# Scenarios\n\n");
        out.push_str("| Scenario | Prevalence | Sensitivity | Specificity | P(D\\|+) |\n");
        out.push_str("|---|---:|---:|---:|---:|\n");
        for entry in &self.scenarios {
            let s = &entry.scenario;
            out.push_str(&format!(
                "| {} | {}% | {}% | {}% | {} |\n",
                table_cell(&s.name),
                s.prevalence,
                s.sensitivity,
                s.specificity,
                format_percent(entry.posterior)
            ));
        }
        out
    }

    fn prose(&self) -> String {
        self.scenarios
            .iter()
            .map(|e| {
                let mut line = format!(
                    "{}: a positive test means a {} chance of the condition.",
                    e.scenario.name,
                    format_percent(e.posterior)
                );
                if !e.scenario.insight.is_empty() {
                    line.push(' ');
                    line.push_str(&e.scenario.insight);
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Escape `|` so text stays inside one markdown table cell.
fn table_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

// ============================================================================
// sweep
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub parameter: Parameter,
    pub base: RateInputs,
    pub start: f64,
    pub end: f64,
    pub step: f64,
    pub points: Vec<SweepPoint>,
}

impl Report for SweepReport {
    fn command(&self) -> &'static str {
        "sweep"
    }

    fn summary(&self) -> String {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => format!(
                "{} {}..{}: P(D|+) {} -> {} ({} points)",
                self.parameter,
                first.value,
                last.value,
                format_percent(first.posterior),
                format_percent(last.posterior),
                self.points.len()
            ),
            _ => format!("{}: no points", self.parameter),
        }
    }

    fn markdown(&self) -> String {
        let mut out = format!("# Sweep of {}\n\n", self.parameter);
        out.push_str(&format!("Base: {}\n\n", rates_line(&self.base)));
        out.push_str(&format!(
            "| {} | P(D\\|+) | True positives | False positives |\n",
            self.parameter
        ));
        out.push_str("|---:|---:|---:|---:|\n");
        for p in &self.points {
            out.push_str(&format!(
                "| {} | {} | {:.1} | {:.1} |\n",
                p.value,
                format_percent(p.posterior),
                p.true_positive,
                p.false_positive
            ));
        }
        out
    }

    fn prose(&self) -> String {
        self.points
            .iter()
            .map(|p| {
                format!(
                    "At {} {}%, a positive test means a {} chance of the condition.",
                    self.parameter,
                    p.value,
                    format_percent(p.posterior)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ============================================================================
// lab
// ============================================================================

impl Report for LabStep {
    fn command(&self) -> &'static str {
        "lab"
    }

    fn summary(&self) -> String {
        format!(
            "step {}: P(D|+) = {}. {}",
            self.step,
            format_percent(self.result.posterior),
            self.explanation.text
        )
    }

    fn markdown(&self) -> String {
        let mut out = format!("## Step {}\n\n", self.step);
        if let Some(name) = &self.scenario {
            out.push_str(&format!("Scenario: {}\n\n", name));
        }
        out.push_str(&format!("Inputs: {}\n\n", rates_line(&self.inputs)));
        out.push_str(&format!(
            "**P(D|+) = {}**\n\n",
            format_percent(self.result.posterior)
        ));
        out.push_str(&frequency_table(&self.result));
        out.push('\n');
        out.push_str(&self.explanation.text);
        out.push('\n');
        out
    }

    fn prose(&self) -> String {
        let mut out = format!(
            "P(D|+) = {}. {}",
            format_percent(self.result.posterior),
            self.result.natural_frequency_sentence()
        );
        if let Some(insight) = &self.insight {
            out.push(' ');
            out.push_str(insight);
        }
        out.push(' ');
        out.push_str(&self.explanation.text);
        out
    }
}

// ============================================================================
// check
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<ConfigSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckReport {
    pub fn ok(snapshot: ConfigSnapshot) -> Self {
        Self {
            status: "ok",
            snapshot: Some(snapshot),
            error: None,
        }
    }

    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self {
            status: "error",
            snapshot: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl Report for CheckReport {
    fn command(&self) -> &'static str {
        "check"
    }

    fn summary(&self) -> String {
        if self.is_ok() {
            "OK".to_string()
        } else {
            "FAILED".to_string()
        }
    }

    fn markdown(&self) -> String {
        let mut out = String::from("# bayes-lab check\n\n");
        match (&self.snapshot, &self.error) {
            (Some(s), _) => {
                out.push_str(&format!("✓ config: ok ({})\n", s.config_source));
                if let Some(path) = &s.config_path {
                    out.push_str(&format!("  Path: {}\n", path));
                }
                out.push_str(&format!("  Hash: {}\n", s.short_id()));
                out.push_str(&format!(
                    "  Scenarios: {} ({} custom)\n",
                    s.summary.scenario_count, s.summary.custom_scenario_count
                ));
            }
            (None, Some(error)) => {
                out.push_str("✗ config: error\n");
                out.push_str(&format!("  Error: {}\n", error));
            }
            (None, None) => {}
        }
        out
    }

    fn prose(&self) -> String {
        match (&self.snapshot, &self.error) {
            (Some(s), _) => format!(
                "Configuration is valid ({}); {} scenarios available.",
                s.config_source, s.summary.scenario_count
            ),
            (None, Some(error)) => format!("Configuration is invalid: {}", error),
            (None, None) => String::new(),
        }
    }
}
