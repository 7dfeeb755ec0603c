//! bayesnet core - exact inference on discrete Bayesian networks
//!
//! The main entry point for bn-core, handling:
//! - Network loading from files or built-in presets
//! - Posterior queries by enumeration
//! - Joint probabilities of full assignments
//! - Network inspection and validation

use std::io::IsTerminal;
use std::path::PathBuf;

use bn_common::{Error, OutputFormat, SCHEMA_VERSION};
use bn_config::{list_presets, network_json_schema, CONFIG_SCHEMA_VERSION};
use bn_core::cli::parse_assignment;
use bn_core::config::{load_network, ConfigError, NetworkOptions, ResolvedNetwork};
use bn_core::exit_codes::ExitCode;
use bn_core::inference::{infer, joint_probability, log_joint_probability, marginals, Posterior};
use bn_core::log_event;
use bn_core::logging::{
    event_names, generate_run_id, get_host_id, init_logging, LogConfig, LogContext, LogFormat,
    LogLevel, Stage,
};
use bn_core::output;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// bayesnet core - exact inference on discrete Bayesian networks
#[derive(Parser)]
#[command(name = "bn-core")]
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
    /// Network file (.json, .toml, .yaml); falls back to BAYESNET_NETWORK and the XDG config
    #[arg(long, short = 'n', global = true)]
    network: Option<PathBuf>,

    /// Use a built-in network instead of a file (see `bn-core presets`)
    #[arg(long, short = 'p', global = true, conflicts_with = "network")]
    preset: Option<String>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format on stderr (human or jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Posterior distribution of one variable given evidence
    Infer(InferArgs),

    /// Posterior of every unobserved variable
    Marginals(EvidenceArgs),

    /// Joint probability of a full assignment
    Joint(JointArgs),

    /// List nodes, domains, parents, and edges
    Describe,

    /// Load and validate the network
    Check,

    /// List built-in networks
    Presets,

    /// Print a JSON Schema
    Schema(SchemaArgs),

    /// Print version information
    Version,
}

// ============================================================================
// Command argument structs
// ============================================================================

#[derive(Args, Debug)]
struct InferArgs {
    /// Variable to query
    #[arg(long, short = 'Q')]
    query: String,

    #[command(flatten)]
    evidence: EvidenceArgs,
}

#[derive(Args, Debug)]
struct EvidenceArgs {
    /// Observed values as Node=value (comma-separated or repeated)
    #[arg(long, short = 'e')]
    evidence: Vec<String>,
}

#[derive(Args, Debug)]
struct JointArgs {
    /// A value for every node, as Node=value (comma-separated or repeated)
    #[arg(long, short = 'a', required = true)]
    assign: Vec<String>,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Which document to describe
    #[arg(value_enum, default_value = "network")]
    kind: SchemaKind,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SchemaKind {
    /// Network definition files
    Network,
    /// The posterior object printed by `infer`
    Posterior,
}

// ============================================================================
// Main entry point
// ============================================================================

fn main() {
    let cli = Cli::parse();

    let cli_level = if cli.global.quiet {
        Some(LogLevel::Error)
    } else {
        LogLevel::from_verbosity(cli.global.verbose)
    };
    let log_config = LogConfig::from_env(cli_level, cli.global.log_format);
    init_logging(&log_config);

    let ctx = LogContext::new(generate_run_id(), get_host_id());
    log_event!(
        ctx,
        DEBUG,
        event_names::RUN_STARTED,
        Stage::Init,
        "bn-core started",
        command = command_name(&cli.command)
    );

    let exit_code = match run(&cli, &ctx) {
        Ok(()) => ExitCode::Clean,
        Err(err) => report_error(&cli.global, &ctx, &err),
    };

    log_event!(
        ctx,
        DEBUG,
        event_names::RUN_FINISHED,
        Stage::Output,
        "bn-core finished",
        exit_code = exit_code.as_i32()
    );
    std::process::exit(exit_code.as_i32());
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Infer(_) => "infer",
        Commands::Marginals(_) => "marginals",
        Commands::Joint(_) => "joint",
        Commands::Describe => "describe",
        Commands::Check => "check",
        Commands::Presets => "presets",
        Commands::Schema(_) => "schema",
        Commands::Version => "version",
    }
}

fn run(cli: &Cli, ctx: &LogContext) -> Result<(), Error> {
    let global = &cli.global;
    match &cli.command {
        Commands::Infer(args) => run_infer(global, ctx, args),
        Commands::Marginals(args) => run_marginals(global, ctx, args),
        Commands::Joint(args) => run_joint(global, ctx, args),
        Commands::Describe => {
            let resolved = load(global, ctx)?;
            emit(output::render_describe(
                global.format,
                &resolved.network,
                resolved.spec.description.as_deref(),
                &resolved.snapshot,
            ));
            Ok(())
        }
        Commands::Check => {
            let resolved = load(global, ctx)?;
            emit(output::render_check(
                global.format,
                &resolved.network,
                &resolved.snapshot,
            ));
            Ok(())
        }
        Commands::Presets => {
            emit(output::render_presets(global.format, &list_presets()));
            Ok(())
        }
        Commands::Schema(args) => run_schema(global, args),
        Commands::Version => {
            print_version(global);
            Ok(())
        }
    }
}

// ============================================================================
// Command implementations
// ============================================================================

fn load(global: &GlobalOpts, ctx: &LogContext) -> Result<ResolvedNetwork, Error> {
    let options = NetworkOptions {
        network_path: global.network.clone(),
        preset: global.preset.clone(),
    };
    log_event!(
        ctx,
        DEBUG,
        event_names::NETWORK_RESOLVED,
        Stage::Load,
        "resolving network",
        preset = options.preset.as_deref().unwrap_or("-"),
        explicit_path = options.network_path.is_some()
    );
    match load_network(&options) {
        Ok(resolved) => {
            let ctx = ctx.clone().with_network(resolved.name());
            log_event!(
                ctx,
                INFO,
                event_names::NETWORK_LOADED,
                Stage::Load,
                "network loaded",
                source = resolved.snapshot.source.as_str(),
                nodes = resolved.snapshot.node_count,
                edges = resolved.snapshot.edge_count,
                hash = resolved.snapshot.short_hash()
            );
            Ok(resolved)
        }
        Err(err) => {
            match &err {
                ConfigError::Invalid { source, .. } => log_event!(
                    ctx,
                    WARN,
                    event_names::NETWORK_INVALID,
                    Stage::Validate,
                    "network file rejected",
                    reason = err.to_string().as_str(),
                    validation_code = source.code()
                ),
                ConfigError::Network { .. } => log_event!(
                    ctx,
                    WARN,
                    event_names::NETWORK_INVALID,
                    Stage::Validate,
                    "network rejected",
                    reason = err.to_string().as_str()
                ),
                _ => {}
            }
            Err(err.into())
        }
    }
}

fn run_infer(global: &GlobalOpts, ctx: &LogContext, args: &InferArgs) -> Result<(), Error> {
    let evidence = parse_assignment(&args.evidence.evidence)?;
    let resolved = load(global, ctx)?;
    let posterior = infer(&resolved.network, &args.query, &evidence)?;
    let ctx = ctx.clone().with_network(resolved.name());
    log_event!(
        ctx,
        INFO,
        event_names::QUERY_ANSWERED,
        Stage::Infer,
        "posterior computed",
        query = posterior.query.as_str(),
        hidden_combinations = posterior.hidden_combinations
    );
    emit(output::render_posterior(
        global.format,
        &posterior,
        &resolved.snapshot,
    ));
    Ok(())
}

fn run_marginals(global: &GlobalOpts, ctx: &LogContext, args: &EvidenceArgs) -> Result<(), Error> {
    let evidence = parse_assignment(&args.evidence)?;
    let resolved = load(global, ctx)?;
    let all = marginals(&resolved.network, &evidence)?;
    emit(output::render_marginals(
        global.format,
        &all,
        &evidence,
        &resolved.snapshot,
    ));
    Ok(())
}

fn run_joint(global: &GlobalOpts, ctx: &LogContext, args: &JointArgs) -> Result<(), Error> {
    let assignment = parse_assignment(&args.assign)?;
    let resolved = load(global, ctx)?;
    let network = &resolved.network;
    if let Some(extra) = assignment.keys().find(|k| !network.contains(k)) {
        return Err(Error::InvalidQuery(format!(
            "variable '{}' is not in the network",
            extra
        )));
    }
    if let Some((node, value)) = assignment
        .iter()
        .find(|(k, v)| network.node(k).is_some_and(|n| !n.has_value(v)))
    {
        return Err(Error::InvalidQuery(format!(
            "'{}' is not a value of '{}'",
            value, node
        )));
    }
    let p = joint_probability(network, &assignment)?;
    let log_p = log_joint_probability(network, &assignment)?;
    emit(output::render_joint(
        global.format,
        &assignment,
        p,
        log_p,
        &resolved.snapshot,
    ));
    Ok(())
}

fn run_schema(global: &GlobalOpts, args: &SchemaArgs) -> Result<(), Error> {
    if global.format == OutputFormat::Exitcode {
        return Ok(());
    }
    let schema = match args.kind {
        SchemaKind::Network => network_json_schema(),
        SchemaKind::Posterior => serde_json::to_value(schemars::schema_for!(Posterior))?,
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn print_version(global: &GlobalOpts) {
    let version_info = serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "network_schema_version": CONFIG_SCHEMA_VERSION,
        "bn_core_version": env!("CARGO_PKG_VERSION"),
    });

    match global.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&version_info).unwrap_or_default()
            );
        }
        OutputFormat::Exitcode => {}
        _ => {
            println!("bn-core {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {}", SCHEMA_VERSION);
        }
    }
}

fn emit(text: Option<String>) {
    if let Some(text) = text {
        println!("{}", text);
    }
}

fn report_error(global: &GlobalOpts, ctx: &LogContext, err: &Error) -> ExitCode {
    let exit_code = ExitCode::from(err);
    if exit_code.is_internal_error() {
        log_event!(
            ctx,
            WARN,
            event_names::INTERNAL_ERROR,
            Stage::Output,
            "internal error",
            code = err.code()
        );
    }
    match global.format {
        OutputFormat::Json => println!("{}", output::render_error(global.format, err, false)),
        OutputFormat::Exitcode => {}
        _ => {
            let use_color = !global.no_color && std::io::stderr().is_terminal();
            eprintln!("{}", output::render_error(global.format, err, use_color));
        }
    }
    exit_code
}
