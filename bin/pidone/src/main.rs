//! pidone - command line front end
//!
//! Exposes the execution core to boot scripts and operators: run a command,
//! run a narrated boot step, drive a script directory or supervise a console.

use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context};
use nix::sys::wait::{waitpid, WaitStatus};
use tracing::{debug, error, info};

use pidone::boot::run_local_scripts;
use pidone::{exec, init, init_with_config, spawn_console, BootContext};

/// Subcommand to execute
#[derive(Debug, PartialEq)]
enum Action {
    Run(String),
    Interactive {
        command: String,
        description: Option<String>,
    },
    RunParts {
        dir: PathBuf,
        argument: Option<String>,
    },
    Console {
        program: PathBuf,
        args: Vec<String>,
        attach: bool,
    },
    Local,
}

/// Parsed command line
#[derive(Debug, Default)]
struct AppArgs {
    /// Configuration file path
    config_path: Option<PathBuf>,
    /// Enable debug mode
    debug: bool,
    /// Disable narration
    quiet: bool,
    /// Subcommand
    action: Option<Action>,
}

impl AppArgs {
    /// Parse command line arguments
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut app_args = AppArgs::default();

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--config" | "-c" => {
                    let Some(path) = args.get(i + 1) else {
                        bail!("Missing config file path");
                    };
                    app_args.config_path = Some(PathBuf::from(path));
                    i += 1;
                }
                "--debug" | "-d" => app_args.debug = true,
                "--quiet" | "-q" => app_args.quiet = true,
                "--help" | "-?" => {
                    print_help();
                    process::exit(0);
                }
                "--version" | "-v" => {
                    println!("pidone v{}", pidone::VERSION);
                    process::exit(0);
                }
                arg if arg.starts_with('-') => bail!("Unknown option: {}", arg),
                _ => {
                    app_args.action = Some(parse_action(&args[i..])?);
                    break;
                }
            }
            i += 1;
        }

        Ok(app_args)
    }
}

fn parse_action(args: &[String]) -> anyhow::Result<Action> {
    let rest = &args[1..];
    let action = match args[0].as_str() {
        "run" => Action::Run(required(rest, 0, "command line")?),
        "interactive" => Action::Interactive {
            command: required(rest, 0, "command line")?,
            description: rest.get(1).cloned(),
        },
        "run-parts" => Action::RunParts {
            dir: PathBuf::from(required(rest, 0, "directory")?),
            argument: rest.get(1).cloned(),
        },
        "console" => {
            let attach = rest.first().is_some_and(|arg| arg == "--attach");
            let rest = if attach { &rest[1..] } else { rest };
            Action::Console {
                program: PathBuf::from(required(rest, 0, "program")?),
                args: rest.to_vec(),
                attach,
            }
        }
        "local" => Action::Local,
        other => bail!("Unknown command: {}", other),
    };
    Ok(action)
}

fn required(args: &[String], index: usize, what: &str) -> anyhow::Result<String> {
    args.get(index)
        .cloned()
        .with_context(|| format!("Missing {}", what))
}

/// Print help information
fn print_help() {
    println!("pidone - process execution core for a PID 1 init");
    println!();
    println!("USAGE:");
    println!("    pidone [OPTIONS] <COMMAND>");
    println!();
    println!("COMMANDS:");
    println!("    run <cmdline>                       Run a command with stdio silenced");
    println!("    interactive <cmdline> [text]        Run a narrated boot step");
    println!("    run-parts <dir> [argument]          Run every executable in a directory");
    println!("    console [--attach] <program> [args] Supervise a console until shutdown");
    println!("    local                               Run the run-parts directory and rc.local");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <PATH>    Path to configuration file");
    println!("    -d, --debug            Show child output live, enable debug logs");
    println!("    -q, --quiet            Disable narration and capture");
    println!("    -?, --help             Print this help message");
    println!("    -v, --version          Print version information");
    println!();
    println!("ENVIRONMENT:");
    println!("    PIDONE_CONFIG     Path to configuration file");
    println!("    PIDONE_DEBUG      Enable debug mode (1 or true)");
    println!("    PIDONE_VERBOSE    Enable or disable narration (1 or 0)");
    println!("    RUST_LOG          Set logging level (error, warn, info, debug, trace)");
}

fn main() {
    let argv: Vec<String> = env::args().skip(1).collect();
    let args = AppArgs::parse(&argv).unwrap_or_else(|e| {
        eprintln!("{}", e);
        print_help();
        process::exit(1);
    });

    // Initialize logging based on debug flag
    let debug_env = env::var("PIDONE_DEBUG").is_ok_and(|v| v == "1" || v.to_lowercase() == "true");
    let log_level = if args.debug || debug_env { "debug" } else { "info" };
    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from(env_filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let code = match dispatch(args) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            1
        }
    };
    process::exit(code);
}

fn dispatch(args: AppArgs) -> anyhow::Result<i32> {
    let Some(action) = args.action else {
        print_help();
        return Ok(1);
    };

    let mut ctx = load_context(args.config_path.as_deref())?;
    if args.debug {
        ctx.config.debug = true;
    }
    if args.quiet {
        ctx.config.verbose = false;
    }
    debug!("Configuration: {:?}", ctx.config);

    let code = match action {
        Action::Run(command) => exec::run_with(
            &command,
            &exec::RunOptions::from_config(&ctx.config),
        ),
        Action::Interactive {
            command,
            description,
        } => exec::run_interactive(&ctx, &command, description.as_deref()),
        Action::RunParts { dir, argument } => exec::run_parts(&dir, argument.as_deref()),
        Action::Console {
            program,
            args,
            attach,
        } => {
            let pid = spawn_console(&ctx.config, &program, &args, attach)?;
            info!("Supervising {} as pid {}", program.display(), pid);
            match waitpid(pid, None).context("waiting for console supervisor")? {
                WaitStatus::Exited(_, code) => code,
                _ => 1,
            }
        }
        Action::Local => {
            let done = run_local_scripts(&ctx);
            [done.runparts, done.rc_local]
                .into_iter()
                .flatten()
                .find(|code| *code != 0)
                .unwrap_or(0)
        }
    };

    Ok(code)
}

fn load_context(config_path: Option<&std::path::Path>) -> anyhow::Result<BootContext> {
    match config_path {
        Some(path) => init_with_config(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(init()),
    }
}
