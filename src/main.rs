//! Defectlab CLI entrypoint.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use std::path::PathBuf;
use std::process::ExitCode;

use defectlab::{Category, Config, ExitStatus, Reporter, RunOptions, RunSummary};

#[derive(Debug, Parser)]
#[command(name = "defectlab")]
#[command(about = "deterministic fault-injection harness with forty scripted defect scenarios")]
struct Cli {
    /// Path to config file. Missing configs are treated as "defaults".
    #[arg(long, global = true, default_value = "defectlab.toml")]
    config: PathBuf,

    /// Log level.
    #[arg(long, global = true, default_value = "info")]
    log: String,

    /// Machine-readable output to stdout (JSON).
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List catalog scenarios grouped by category
    List {
        #[arg(long)]
        category: Option<Category>,

        /// Id glob, e.g. `auth_*` or `*_03`.
        #[arg(long)]
        filter: Option<String>,
    },

    /// Show one scenario: tier, title, actions and reproduction hints
    Show { id: String },

    /// Run an inline session against one scenario
    Exec {
        id: String,

        /// Step: an action name, `advance:<duration>`, `text:<value>`,
        /// `check`, `uncheck`, `tab:<tab>` or `return`. Repeatable.
        #[arg(long = "step")]
        steps: Vec<String>,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        wall: bool,

        #[arg(long)]
        timeline: Option<PathBuf>,

        #[arg(long)]
        reporter: Option<Reporter>,
    },

    /// Run a recording script file
    Run {
        script: PathBuf,

        /// Use real time instead of the virtual clock.
        #[arg(long)]
        wall: bool,

        #[arg(long)]
        seed: Option<u64>,

        /// Write the timeline here instead of under the base dir.
        #[arg(long)]
        timeline: Option<PathBuf>,

        #[arg(long)]
        reporter: Option<Reporter>,
    },

    /// Print version, build and capability info
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_global_args(std::env::args()));

    if let Err(err) = init_tracing(&cli.log) {
        // Tracing is best-effort; if it fails, we still continue.
        eprintln!("warning: failed to init tracing: {err:#}");
    }
    install_panic_hook();

    let config = Config::load_optional(&cli.config);

    match run_command(&cli, &config) {
        Ok(code) => code,
        Err(err) => print_error_and_exit(&cli, err),
    }
}

fn normalize_global_args(args: impl IntoIterator<Item = String>) -> Vec<String> {
    let all: Vec<String> = args.into_iter().collect();
    if all.is_empty() {
        return all;
    }

    let mut globals = Vec::new();
    let mut rest = Vec::new();

    let mut i = 1usize;
    while i < all.len() {
        let arg = &all[i];
        match arg.as_str() {
            "--json" => {
                globals.push(arg.clone());
                i += 1;
            }
            "--config" | "--log" => {
                globals.push(arg.clone());
                if i + 1 < all.len() {
                    globals.push(all[i + 1].clone());
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ if arg.starts_with("--config=") || arg.starts_with("--log=") => {
                globals.push(arg.clone());
                i += 1;
            }
            _ => {
                rest.push(arg.clone());
                i += 1;
            }
        }
    }

    let mut normalized = Vec::with_capacity(all.len());
    normalized.push(all[0].clone());
    normalized.extend(globals);
    normalized.extend(rest);
    normalized
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))?;
    Ok(())
}

/// Scripted faults are caught by the crash boundary and logged there, so
/// their panics stay at debug level. Any other panic is a harness bug and
/// keeps the default hook's report.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if defectlab::inside_crash_boundary() {
            tracing::debug!("scenario panic: {info}");
        } else {
            tracing::error!("harness panic: {info}");
            default_hook(info);
        }
    }));
}

fn run_command(cli: &Cli, config: &Config) -> anyhow::Result<ExitCode> {
    match &cli.command {
        Command::List { category, filter } => {
            let listing = defectlab::list_scenarios(*category, filter.as_deref())?;
            if cli.json {
                print_json(&listing)?;
            } else {
                println!("{}", defectlab::pretty_listing(&listing));
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Show { id } => {
            let detail = defectlab::show_scenario(id)?;
            if cli.json {
                print_json(&detail)?;
            } else {
                println!("{}", detail.pretty());
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Exec {
            id,
            steps,
            seed,
            wall,
            timeline,
            reporter,
        } => {
            let summary = defectlab::exec_inline(
                config,
                id,
                steps,
                &RunOptions {
                    seed: *seed,
                    wall: *wall,
                    timeline_out: timeline.clone(),
                },
            )?;
            print_run_summary(cli, config, *reporter, &summary)?;
            Ok(exit_code_for_status(summary.status))
        }

        Command::Run {
            script,
            wall,
            seed,
            timeline,
            reporter,
        } => {
            let summary = defectlab::run_script(
                config,
                script,
                &RunOptions {
                    seed: *seed,
                    wall: *wall,
                    timeline_out: timeline.clone(),
                },
            )?;
            print_run_summary(cli, config, *reporter, &summary)?;
            Ok(exit_code_for_status(summary.status))
        }

        Command::Version => {
            let info = defectlab::env_info(config);
            if cli.json {
                print_json(&info)?;
            } else {
                println!("defectlab {}", info.defectlab.version);
                if let Some(commit) = &info.defectlab.commit {
                    println!("commit {commit}");
                }
                println!("{} scenarios, {}/{}", info.scenarios, info.os, info.arch);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_run_summary(
    cli: &Cli,
    config: &Config,
    reporter: Option<Reporter>,
    summary: &RunSummary,
) -> anyhow::Result<()> {
    let reporter = if cli.json { Reporter::Json } else { reporter.unwrap_or(config.reporter) };
    match reporter {
        Reporter::Json => print_json(summary)?,
        Reporter::Pretty => println!("{}", summary.pretty()),
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

fn print_error_and_exit(cli: &Cli, err: anyhow::Error) -> ExitCode {
    let msg = format!("{err:#}");
    if cli.json {
        let out = serde_json::json!({
            "status": "error",
            "code": error_code(&err),
            "message": msg,
        });
        println!("{out}");
    } else {
        eprintln!("{msg}");
    }
    ExitCode::from(2)
}

fn error_code(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<defectlab::HarnessError>() {
        Some(defectlab::HarnessError::ScenarioNotFound(_)) => "scenario_not_found",
        Some(defectlab::HarnessError::Script(_)) => "script",
        Some(defectlab::HarnessError::InvalidArgument(_)) => "invalid_argument",
        _ => "error",
    }
}

fn exit_code_for_status(status: ExitStatus) -> ExitCode {
    ExitCode::from(status.code() as u8)
}
