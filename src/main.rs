//! claude-shell-guard - Security policy hook for Claude Code shell commands
//!
//! # Usage
//!
//! ```bash
//! # As a PreToolUse hook (reads the event JSON from stdin, exit 2 blocks)
//! echo '{"tool_name":"Bash","tool_input":{"command":"rm -rf /"}}' | claude-shell-guard
//!
//! # As a PostToolUse audit hook (always exits 0)
//! claude-shell-guard audit < event.json
//!
//! # Try a command against the policy without prompting
//! claude-shell-guard test "git push --force" --cwd ~/src/app
//!
//! # Write the recommended policy, then check it
//! claude-shell-guard init && claude-shell-guard lint
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::error;
use tracing_subscriber::EnvFilter;

use claude_shell_guard::{
    audit::{AuditTrail, SecurityLog},
    config::{Policy, DEFAULT_POLICY_PATH},
    confirm,
    engine::{matcher, Evaluation, SecurityEngine},
    error::PolicyError,
    hook,
    output::HookReport,
};

/// Environment variable holding the tracing filter
const LOG_ENV: &str = "SHELL_GUARD_LOG";

/// Exit code for tool errors in `lint`, `init` and `test`
const EXIT_TOOL_ERROR: i32 = 1;

#[derive(Parser)]
#[command(name = "claude-shell-guard", version)]
#[command(about = "Security policy hook for Claude Code shell commands", long_about = None)]
struct Cli {
    /// Policy file (TOML, or JSON with a .json extension)
    #[arg(short, long, global = true)]
    policy: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide on a hook event read from stdin (default)
    Check,

    /// Record a hook event read from stdin in the audit trail
    Audit,

    /// Evaluate one command and print the verdict
    Test {
        /// The command to evaluate
        command: String,

        /// Working directory to evaluate against
        #[arg(long)]
        cwd: Option<String>,
    },

    /// Report policy patterns the regex engine rejects
    Lint,

    /// Write the recommended policy
    Init {
        /// Overwrite an existing policy file
        #[arg(long)]
        force: bool,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn emit(report: &HookReport) -> i32 {
    if let Err(e) = report.emit() {
        error!("failed to write hook output: {}", e);
    }
    report.exit_code
}

async fn run_check(policy_path: Option<&Path>) -> i32 {
    let policy = Policy::load(policy_path);
    let log = SecurityLog::for_policy(&policy);
    let engine = SecurityEngine::new(policy);

    let report = match hook::read_event(tokio::io::stdin()).await {
        Ok(raw) => {
            let mut confirmer = confirm::terminal().await;
            hook::check_event(&raw, &engine, &log, &mut confirmer).await
        }
        Err(e) => {
            error!("failed to read hook event: {}", e);
            log.log_error(&e.to_string(), None);
            HookReport::system_error(&e.to_string())
        }
    };

    emit(&report)
}

async fn run_audit(policy_path: Option<&Path>) -> i32 {
    let policy = Policy::load(policy_path);
    let trail = AuditTrail::new(policy.log_dir());
    let engine = SecurityEngine::new(policy);

    let report = match hook::read_event(tokio::io::stdin()).await {
        Ok(raw) => hook::run_audit(&raw, &engine, &trail),
        Err(e) => {
            error!("failed to read hook event: {}", e);
            trail.log_error(&e.to_string(), None);
            HookReport::allow("Audit skipped")
        }
    };

    emit(&report)
}

/// Policy for the interactive tools: an explicit path must load
fn load_for_tool(policy_path: Option<&Path>) -> Result<Policy, PolicyError> {
    match policy_path {
        Some(path) => Policy::load_from(path),
        None => Ok(Policy::load(None)),
    }
}

fn run_test(policy_path: Option<&Path>, command: &str, cwd: Option<String>) -> i32 {
    let policy = match load_for_tool(policy_path) {
        Ok(policy) => policy,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_TOOL_ERROR;
        }
    };

    let working_dir = cwd.unwrap_or_else(|| {
        std::env::current_dir()
            .map(|dir| dir.display().to_string())
            .unwrap_or_else(|_| ".".to_string())
    });

    let engine = SecurityEngine::new(policy);
    let rendered = match engine.evaluate(command, &working_dir) {
        Evaluation::Bypassed => serde_json::to_string_pretty(&serde_json::json!({
            "action": "allow",
            "reason": "Bypass keyword detected",
            "bypassed": true,
        })),
        Evaluation::Validated(result) => serde_json::to_string_pretty(&result),
    };

    match rendered {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_TOOL_ERROR
        }
    }
}

fn run_lint(policy_path: Option<&Path>) -> i32 {
    let path = match policy_path {
        Some(path) => path.to_path_buf(),
        None => match Policy::search_paths().into_iter().find(|p| p.exists()) {
            Some(path) => path,
            None => {
                eprintln!("Error: no policy file found (run `claude-shell-guard init`)");
                return EXIT_TOOL_ERROR;
            }
        },
    };

    let policy = match Policy::load_from(&path) {
        Ok(policy) => policy,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_TOOL_ERROR;
        }
    };

    let mut problems = Vec::new();
    for (name, category) in policy.categories.iter() {
        let lists = [
            ("block_patterns", &category.block_patterns),
            ("require_confirmation", &category.confirm_patterns),
        ];
        for (list, patterns) in lists {
            for (pattern, err) in matcher::invalid_patterns(patterns) {
                // The regex crate puts the diagnosis on the last line
                let summary = err.lines().last().unwrap_or_default().trim();
                problems.push(format!("{}.{}: {:?}: {}", name, list, pattern, summary));
            }
        }
    }
    if policy.bypass.enabled && policy.bypass.keyword.is_empty() {
        problems.push("bypass: enabled with an empty keyword (never matches)".to_string());
    }

    if problems.is_empty() {
        println!(
            "{}: OK ({} categories{})",
            path.display(),
            policy.categories.len(),
            if policy.enabled { "" } else { ", policy disabled" }
        );
        0
    } else {
        for problem in &problems {
            eprintln!("{}", problem);
        }
        eprintln!("{}: {} problem(s)", path.display(), problems.len());
        EXIT_TOOL_ERROR
    }
}

fn run_init(policy_path: Option<&Path>, force: bool) -> i32 {
    let path = policy_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| Policy::expand_path(DEFAULT_POLICY_PATH));

    if path.exists() && !force {
        eprintln!(
            "Error: {} already exists (use --force to overwrite)",
            path.display()
        );
        return EXIT_TOOL_ERROR;
    }

    let written = Policy::recommended().to_toml().and_then(|toml| {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| PolicyError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&path, toml).map_err(|source| PolicyError::Io {
            path: path.clone(),
            source,
        })
    });

    match written {
        Ok(()) => {
            println!("Wrote recommended policy to {}", path.display());
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_TOOL_ERROR
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let policy_path = cli.policy.as_deref();
    let code = match cli.command.unwrap_or(Commands::Check) {
        Commands::Check => run_check(policy_path).await,
        Commands::Audit => run_audit(policy_path).await,
        Commands::Test { command, cwd } => run_test(policy_path, &command, cwd),
        Commands::Lint => run_lint(policy_path),
        Commands::Init { force } => run_init(policy_path, force),
    };

    // Exit here so an abandoned terminal read cannot hold the process open
    std::process::exit(code);
}
