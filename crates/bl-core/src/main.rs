//! Bayes Lab - how base rates shape the meaning of a positive test
//!
//! The main entry point for bayes-lab, handling:
//! - One-shot posterior computation and change explanation
//! - Scenario catalog browsing and parameter sweeps
//! - The line-driven lab session on stdin
//! - Configuration checks, schemas, and shell completions

use std::io::{BufRead, Write};
use std::path::PathBuf;

use bl_common::error::StructuredError;
use bl_common::{Error, OutputFormat, Parameter, RateInputs, SessionId, SCHEMA_VERSION};
use bl_config::{validate_rates, Scenario, ScenarioCatalog};
use bl_core::config::{load_config, ConfigError, ConfigOptions, ResolvedConfig};
use bl_core::exit_codes::ExitCode;
use bl_core::inference::{sweep, MAX_SWEEP_POINTS};
use bl_core::lab::{parse_command, LabCommand, LabSession};
use bl_core::log_event;
use bl_core::logging::config::ENV_LOG_FORMAT;
use bl_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogContext, LogFormat, LogLevel, Stage,
};
use bl_core::output::{
    render, CheckReport, ComputeReport, ExplainReport, Report, ScenarioListReport, SweepReport,
};
use bl_core::schema::{
    available_schemas, format_schema, generate_all_schemas, generate_schema, SchemaFormat,
};
use clap::{Args, CommandFactory, Parser, Subcommand};

/// Bayes Lab - explore how prevalence, sensitivity and specificity shape P(D|+)
#[derive(Parser)]
#[command(name = "bayes-lab")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to bayes-lab.json (overrides BAYES_LAB_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the posterior for one set of rates
    Compute(ComputeArgs),

    /// Explain how the posterior moves between two sets of rates
    Explain(ExplainArgs),

    /// List or show scenario presets
    Scenarios(ScenariosArgs),

    /// Posterior curve as one rate varies
    Sweep(SweepArgs),

    /// Interactive session: read edits from stdin, explain each change
    Lab(LabArgs),

    /// Validate configuration
    Check,

    /// Print JSON schema for output types
    Schema(SchemaArgs),

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },

    /// Print version information
    Version,
}

// ============================================================================
// Command argument structs
// ============================================================================

/// Rates given as flags, optionally on top of a scenario.
#[derive(Args, Debug, Default)]
struct RateArgs {
    /// Start from a named scenario; explicit rate flags override its values
    #[arg(long)]
    scenario: Option<String>,

    /// Prevalence (base rate) in percent
    #[arg(long, short = 'p')]
    prevalence: Option<f64>,

    /// Sensitivity (true positive rate) in percent
    #[arg(long, short = 's')]
    sensitivity: Option<f64>,

    /// Specificity (true negative rate) in percent
    #[arg(long, short = 't')]
    specificity: Option<f64>,
}

impl RateArgs {
    fn value(&self, parameter: Parameter) -> Option<f64> {
        match parameter {
            Parameter::Prevalence => self.prevalence,
            Parameter::Sensitivity => self.sensitivity,
            Parameter::Specificity => self.specificity,
        }
    }
}

#[derive(Args, Debug)]
struct ComputeArgs {
    #[command(flatten)]
    rates: RateArgs,
}

#[derive(Args, Debug)]
struct ExplainArgs {
    /// Starting rates as P,S,T
    #[arg(long, conflicts_with = "from_scenario", required_unless_present = "from_scenario")]
    from: Option<String>,

    /// Starting scenario
    #[arg(long)]
    from_scenario: Option<String>,

    /// Final rates as P,S,T
    #[arg(long, conflicts_with = "to_scenario", required_unless_present = "to_scenario")]
    to: Option<String>,

    /// Final scenario
    #[arg(long)]
    to_scenario: Option<String>,
}

#[derive(Args, Debug)]
struct ScenariosArgs {
    #[command(subcommand)]
    command: ScenariosCommands,
}

#[derive(Subcommand, Debug)]
enum ScenariosCommands {
    /// List every scenario with its posterior
    List,
    /// Show one scenario in full
    Show {
        /// Scenario name (case-insensitive)
        name: String,
    },
}

#[derive(Args, Debug)]
struct SweepArgs {
    /// Rate to vary
    #[arg(long)]
    parameter: Parameter,

    /// First value (percent)
    #[arg(long, default_value = "0")]
    start: f64,

    /// Last value (percent)
    #[arg(long, default_value = "100")]
    end: f64,

    /// Increment (percentage points)
    #[arg(long, default_value = "10")]
    step: f64,

    #[command(flatten)]
    rates: RateArgs,
}

#[derive(Args, Debug)]
struct LabArgs {
    /// Starting scenario (default: first in the catalog)
    #[arg(long)]
    scenario: Option<String>,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Type name to print
    name: Option<String>,

    /// List available schema types
    #[arg(long)]
    list: bool,

    /// Print every schema
    #[arg(long, conflicts_with = "name")]
    all: bool,

    /// Single-line JSON
    #[arg(long)]
    compact: bool,
}

// ============================================================================
// Main entry point
// ============================================================================

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.global.quiet {
        Some(LogLevel::Off)
    } else {
        match cli.global.verbose {
            0 => None,
            1 => Some(LogLevel::Info),
            2 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    };
    // Machine output gets machine logs unless the environment says otherwise.
    let log_format = (cli.global.format.is_machine() && std::env::var(ENV_LOG_FORMAT).is_err())
        .then_some(LogFormat::Jsonl);
    init_logging(&LogConfig::from_env(log_level, log_format));

    let ctx = LogContext::new(generate_run_id());
    log_event!(
        ctx,
        DEBUG,
        event_names::RUN_STARTED,
        Stage::Init,
        "bayes-lab started",
        format = tracing::field::display(cli.global.format)
    );

    let exit_code = match &cli.command {
        Commands::Compute(args) => run_compute(&cli.global, &ctx, args),
        Commands::Explain(args) => run_explain(&cli.global, &ctx, args),
        Commands::Scenarios(args) => run_scenarios(&cli.global, &ctx, args),
        Commands::Sweep(args) => run_sweep(&cli.global, &ctx, args),
        Commands::Lab(args) => run_lab(&cli.global, &ctx, args),
        Commands::Check => run_check(&cli.global, &ctx),
        Commands::Schema(args) => run_schema(args),
        Commands::Completions { shell } => {
            clap_complete::generate(
                *shell,
                &mut Cli::command(),
                "bayes-lab",
                &mut std::io::stdout(),
            );
            ExitCode::Clean
        }
        Commands::Version => {
            print_version(&cli.global);
            ExitCode::Clean
        }
    };

    log_event!(
        ctx,
        DEBUG,
        event_names::RUN_FINISHED,
        Stage::Render,
        "bayes-lab finished",
        exit_code = exit_code.as_i32()
    );
    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Shared helpers
// ============================================================================

fn emit<R: Report>(global: &GlobalOpts, session_id: &SessionId, report: &R) {
    if let Some(text) = render(report, global.format, session_id) {
        println!("{}", text);
    }
}

/// Print an error to stderr in the selected format and map it to an exit code.
fn output_error(global: &GlobalOpts, ctx: &LogContext, error: &Error) -> ExitCode {
    let exit_code = ExitCode::from(error);
    log_event!(
        ctx,
        WARN,
        event_names::INPUT_REJECTED,
        Stage::Init,
        error.to_string(),
        code = error.code()
    );

    match global.format {
        OutputFormat::Exitcode => {}
        OutputFormat::Json | OutputFormat::Jsonl => {
            let structured = StructuredError::from(error)
                .with_context("exit_code", exit_code.code_name());
            eprintln!("{}", structured.to_json());
        }
        _ => eprintln!("{}", error.to_human()),
    }
    exit_code
}

fn output_config_error(global: &GlobalOpts, ctx: &LogContext, error: ConfigError) -> ExitCode {
    let exit_code = error.exit_code();
    log_event!(
        ctx,
        WARN,
        event_names::CONFIG_ERROR,
        Stage::Load,
        error.to_string()
    );
    let unified: Error = error.into();
    output_error(global, ctx, &unified);
    exit_code
}

fn load(global: &GlobalOpts, ctx: &LogContext) -> Result<ResolvedConfig, ExitCode> {
    let options = ConfigOptions {
        config_path: global.config.clone(),
    };
    match load_config(&options) {
        Ok(resolved) => {
            if resolved.is_default() {
                log_event!(
                    ctx,
                    DEBUG,
                    event_names::CONFIG_DEFAULT_USED,
                    Stage::Load,
                    "no config file; using built-in defaults"
                );
            } else {
                log_event!(
                    ctx,
                    INFO,
                    event_names::CONFIG_LOADED,
                    Stage::Load,
                    "config loaded",
                    source = tracing::field::display(resolved.paths.source),
                    hash = resolved.config_hash.as_deref().unwrap_or("")
                );
            }
            Ok(resolved)
        }
        Err(e) => Err(output_config_error(global, ctx, e)),
    }
}

fn find<'a>(catalog: &'a ScenarioCatalog, name: &str) -> Result<&'a Scenario, Error> {
    catalog.find(name).ok_or_else(|| Error::ScenarioNotFound {
        name: name.to_string(),
    })
}

/// Reject out-of-range rates before any engine call.
fn check_inputs(inputs: &RateInputs) -> Result<(), Error> {
    validate_rates("", inputs).map_err(|_| match inputs.first_out_of_range() {
        Some((parameter, value)) => Error::InvalidRate { parameter, value },
        None => Error::InvalidArgument("rates out of range".to_string()),
    })
}

/// Rates from flags over an optional scenario. `fill` supplies values for
/// parameters neither source provides.
fn resolve_rates(
    catalog: &ScenarioCatalog,
    args: &RateArgs,
    fill: Option<(Parameter, f64)>,
) -> Result<(RateInputs, Option<Scenario>), Error> {
    let scenario = match &args.scenario {
        Some(name) => Some(find(catalog, name)?.clone()),
        None => None,
    };

    let mut values = [0.0; 3];
    for (slot, parameter) in values.iter_mut().zip(Parameter::ALL) {
        *slot = args
            .value(parameter)
            .or_else(|| scenario.as_ref().map(|s| s.inputs().get(parameter)))
            .or_else(|| fill.filter(|(p, _)| *p == parameter).map(|(_, v)| v))
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "missing --{} (or pass --scenario NAME)",
                    parameter
                ))
            })?;
    }

    let inputs = RateInputs::new(values[0], values[1], values[2]);
    check_inputs(&inputs)?;
    Ok((inputs, scenario))
}

fn parse_side(
    catalog: &ScenarioCatalog,
    triple: Option<&str>,
    scenario: Option<&str>,
) -> Result<RateInputs, Error> {
    let inputs = match (triple, scenario) {
        (Some(triple), _) => RateInputs::parse_triple(triple).map_err(Error::InvalidArgument)?,
        (None, Some(name)) => find(catalog, name)?.inputs(),
        (None, None) => {
            return Err(Error::InvalidArgument(
                "expected P,S,T or a scenario name".to_string(),
            ))
        }
    };
    check_inputs(&inputs)?;
    Ok(inputs)
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_compute(global: &GlobalOpts, ctx: &LogContext, args: &ComputeArgs) -> ExitCode {
    let config = match load(global, ctx) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let catalog = config.catalog();

    let (inputs, scenario) = match resolve_rates(&catalog, &args.rates, None) {
        Ok(r) => r,
        Err(e) => return output_error(global, ctx, &e),
    };

    let mut report = ComputeReport::new(inputs, config.population());
    if let Some(scenario) = &scenario {
        report = report.with_scenario(scenario);
    }
    log_event!(
        ctx,
        INFO,
        event_names::COMPUTE_FINISHED,
        Stage::Compute,
        "posterior computed",
        posterior = report.result.posterior
    );

    emit(global, &SessionId::new(), &report);
    ExitCode::Clean
}

fn run_explain(global: &GlobalOpts, ctx: &LogContext, args: &ExplainArgs) -> ExitCode {
    let config = match load(global, ctx) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let catalog = config.catalog();

    let sides = parse_side(&catalog, args.from.as_deref(), args.from_scenario.as_deref())
        .and_then(|from| {
            parse_side(&catalog, args.to.as_deref(), args.to_scenario.as_deref())
                .map(|to| (from, to))
        });
    let (from, to) = match sides {
        Ok(s) => s,
        Err(e) => return output_error(global, ctx, &e),
    };

    let report = ExplainReport::new(from, to, config.population(), &config.explain_options());
    log_event!(
        ctx,
        INFO,
        event_names::EXPLAIN_FINISHED,
        Stage::Explain,
        "change explained",
        changed = report.explanation.changes.len() as u64
    );

    emit(global, &SessionId::new(), &report);
    ExitCode::Clean
}

fn run_scenarios(global: &GlobalOpts, ctx: &LogContext, args: &ScenariosArgs) -> ExitCode {
    let config = match load(global, ctx) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let catalog = config.catalog();
    let session_id = SessionId::new();

    match &args.command {
        ScenariosCommands::List => {
            let report = ScenarioListReport::new(catalog.list(), config.population());
            emit(global, &session_id, &report);
        }
        ScenariosCommands::Show { name } => {
            let scenario = match find(&catalog, name) {
                Ok(s) => s,
                Err(e) => return output_error(global, ctx, &e),
            };
            let report =
                ComputeReport::new(scenario.inputs(), config.population()).with_scenario(scenario);
            emit(global, &session_id, &report);
        }
    }
    ExitCode::Clean
}

fn run_sweep(global: &GlobalOpts, ctx: &LogContext, args: &SweepArgs) -> ExitCode {
    let config = match load(global, ctx) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let catalog = config.catalog();

    let bounds_ok = args.start.is_finite()
        && args.end.is_finite()
        && (0.0..=100.0).contains(&args.start)
        && (0.0..=100.0).contains(&args.end)
        && args.start <= args.end;
    if !bounds_ok {
        let e = Error::InvalidArgument(format!(
            "sweep range must satisfy 0 <= start <= end <= 100, got {}..{}",
            args.start, args.end
        ));
        return output_error(global, ctx, &e);
    }
    if !(args.step.is_finite() && args.step > 0.0) {
        let e = Error::InvalidArgument(format!("--step must be positive, got {}", args.step));
        return output_error(global, ctx, &e);
    }

    let (base, _) = match resolve_rates(&catalog, &args.rates, Some((args.parameter, args.start)))
    {
        Ok(r) => r,
        Err(e) => return output_error(global, ctx, &e),
    };

    let points = sweep(base, args.parameter, args.start, args.end, args.step);
    if points.len() == MAX_SWEEP_POINTS {
        log_event!(
            ctx,
            WARN,
            event_names::SWEEP_FINISHED,
            Stage::Compute,
            "sweep truncated",
            points = points.len() as u64
        );
    } else {
        log_event!(
            ctx,
            INFO,
            event_names::SWEEP_FINISHED,
            Stage::Compute,
            "sweep computed",
            points = points.len() as u64
        );
    }

    let report = SweepReport {
        parameter: args.parameter,
        base,
        start: args.start,
        end: args.end,
        step: args.step,
        points,
    };
    emit(global, &SessionId::new(), &report);
    ExitCode::Clean
}

fn run_lab(global: &GlobalOpts, ctx: &LogContext, args: &LabArgs) -> ExitCode {
    let config = match load(global, ctx) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let catalog = config.catalog();

    let start = match args.scenario.clone() {
        Some(name) => name,
        None => match catalog.list().first() {
            Some(s) => s.name.clone(),
            None => {
                let e = Error::Config("scenario catalog is empty".to_string());
                return output_error(global, ctx, &e);
            }
        },
    };

    let mut lab = match LabSession::from_scenario(
        catalog,
        &start,
        config.population(),
        config.explain_options(),
    ) {
        Ok(lab) => lab,
        Err(e) => return output_error(global, ctx, &e),
    };
    let ctx = ctx.clone().with_session_id(lab.id().0.clone());
    let session_id = lab.id().clone();
    // Steps stream one per line; pretty JSON would interleave badly.
    let format = match global.format {
        OutputFormat::Json => OutputFormat::Jsonl,
        other => other,
    };

    log_event!(
        ctx,
        INFO,
        event_names::LAB_STARTED,
        Stage::Lab,
        "lab session started",
        scenario = start.as_str()
    );

    let print = |step: &bl_core::lab::LabStep| {
        if let Some(text) = render(step, format, &session_id) {
            let mut out = std::io::stdout().lock();
            let _ = writeln!(out, "{}", text);
            let _ = out.flush();
        }
    };

    print(&lab.observe());

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => return output_error(global, &ctx, &Error::Io(e)),
        };

        let outcome = parse_command(&line).and_then(|command| match command {
            LabCommand::Noop => Ok(None),
            LabCommand::Quit => Ok(Some(None)),
            LabCommand::Show => Ok(Some(Some(lab.observe()))),
            LabCommand::Edit(edit) => lab.apply(edit).map(|step| Some(Some(step))),
        });

        match outcome {
            Ok(None) => {}
            Ok(Some(None)) => break,
            Ok(Some(Some(step))) => {
                log_event!(
                    ctx,
                    INFO,
                    event_names::LAB_STEP,
                    Stage::Lab,
                    step.explanation.text.as_str(),
                    step = step.step,
                    posterior = step.result.posterior
                );
                print(&step);
            }
            Err(e) => {
                log_event!(
                    ctx,
                    WARN,
                    event_names::LAB_REJECTED,
                    Stage::Lab,
                    e.to_string(),
                    input = line.as_str()
                );
                report_lab_error(global, &e);
            }
        }
    }

    log_event!(
        ctx,
        INFO,
        event_names::LAB_FINISHED,
        Stage::Lab,
        "lab session finished",
        steps = lab.steps()
    );
    ExitCode::Clean
}

/// Rejected lab lines are reported and the session continues.
fn report_lab_error(global: &GlobalOpts, error: &Error) {
    match global.format {
        OutputFormat::Exitcode => {}
        OutputFormat::Json | OutputFormat::Jsonl => {
            eprintln!("{}", StructuredError::from(error).to_json());
        }
        _ => eprintln!("{}", error.to_human()),
    }
}

fn run_check(global: &GlobalOpts, ctx: &LogContext) -> ExitCode {
    let options = ConfigOptions {
        config_path: global.config.clone(),
    };
    let (report, exit_code) = match load_config(&options) {
        Ok(config) => (CheckReport::ok(config.snapshot()), ExitCode::Clean),
        Err(e) => {
            log_event!(
                ctx,
                WARN,
                event_names::CONFIG_ERROR,
                Stage::Load,
                e.to_string()
            );
            let code = e.exit_code();
            (CheckReport::failed(e), code)
        }
    };

    emit(global, &SessionId::new(), &report);
    exit_code
}

fn run_schema(args: &SchemaArgs) -> ExitCode {
    let format = if args.compact {
        SchemaFormat::JsonCompact
    } else {
        SchemaFormat::Json
    };

    if args.list {
        for (name, description) in available_schemas() {
            println!("{:<20} {}", name, description);
        }
        return ExitCode::Clean;
    }

    if args.all {
        let all = serde_json::to_value(generate_all_schemas()).unwrap_or_default();
        println!("{}", format_schema(&all, format));
        return ExitCode::Clean;
    }

    let Some(name) = &args.name else {
        eprintln!("error: pass a type name, --list, or --all");
        return ExitCode::ArgsError;
    };
    match generate_schema(name) {
        Some(schema) => {
            println!("{}", format_schema(&schema, format));
            ExitCode::Clean
        }
        None => {
            eprintln!(
                "error: unknown schema type '{}' (see `bayes-lab schema --list`)",
                name
            );
            ExitCode::ArgsError
        }
    }
}

fn print_version(global: &GlobalOpts) {
    let version_info = serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "bayes_lab_version": env!("CARGO_PKG_VERSION"),
        "rust_version": env!("CARGO_PKG_RUST_VERSION"),
    });

    match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => {
            println!(
                "{}",
                serde_json::to_string_pretty(&version_info).unwrap_or_default()
            );
        }
        OutputFormat::Exitcode => {}
        _ => {
            println!("bayes-lab {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {}", SCHEMA_VERSION);
        }
    }
}
