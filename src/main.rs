use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use tracing::{info, warn};

use rust_sqlrewriter::script_io::{collect_scripts, read_script, ScriptFile};
use rust_sqlrewriter::{
    CompatibilityLevel, ConditionalCommentsAction, Environment, IdempotentCreateAction,
    IdentifierRenameAction, IdentityAction, LineEnding, ProcedureNameRenameAction, RewriteAction,
    RewriteOptions, RewriteResult, ScriptRewriter,
};

#[derive(Parser)]
#[command(name = "rust-sqlrewriter")]
#[command(author, version, about = "Token-level T-SQL script rewriter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Make CREATE/ALTER of procedures, functions, views and schemas re-runnable
    Idempotent {
        #[command(flatten)]
        common: CommonArgs,

        /// Only rewrite objects whose `schema.name` matches this glob (repeatable)
        #[arg(long)]
        include: Vec<String>,
    },

    /// Rename every identifier
    RenameIdentifiers {
        #[command(flatten)]
        common: CommonArgs,

        /// Prefix added to identifiers not listed in --map
        #[arg(long, default_value = "")]
        prefix: String,

        /// Suffix added to identifiers not listed in --map
        #[arg(long, default_value = "")]
        suffix: String,

        /// Explicit rename OLD=NEW (repeatable)
        #[arg(long = "map", value_parser = parse_key_value)]
        map: Vec<(String, String)>,
    },

    /// Rename procedures at their definitions and EXEC calls
    RenameProcedures {
        #[command(flatten)]
        common: CommonArgs,

        /// Prefix added to procedure names
        #[arg(long, default_value = "")]
        prefix: String,

        /// Move procedures from schema OLD to NEW (repeatable)
        #[arg(long = "schema-map", value_parser = parse_key_value)]
        schema_map: Vec<(String, String)>,
    },

    /// Expand conditional comments
    Expand {
        #[command(flatten)]
        common: CommonArgs,

        /// JSON object with template variables
        #[arg(long)]
        env: Option<PathBuf>,

        /// Template variable KEY=VALUE, overriding --env (repeatable)
        #[arg(long = "set")]
        set: Vec<String>,
    },

    /// Report parse errors without rewriting
    Check {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// SQL files or directories containing them
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Write rewritten scripts here, keeping relative paths (default: stdout)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Target SQL Server compatibility level (Sql100 .. Sql160)
    #[arg(long, default_value = "Sql110")]
    compat: CompatibilityLevel,

    /// Line ending for generated SQL
    #[arg(long, default_value = "crlf", value_parser = ["crlf", "lf"])]
    line_ending: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl CommonArgs {
    fn rewrite_options(&self) -> RewriteOptions {
        RewriteOptions {
            compatibility: self.compat,
            line_ending: match self.line_ending.as_str() {
                "lf" => LineEnding::Lf,
                _ => LineEnding::CrLf,
            },
        }
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, found '{s}'"))
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Idempotent { common, include } => {
            init_tracing(common.verbose);
            let patterns = include
                .iter()
                .map(|p| glob::Pattern::new(p).with_context(|| format!("Invalid --include pattern: {p}")))
                .collect::<Result<Vec<_>>>()?;
            let action = IdempotentCreateAction::new(move |schema, name| {
                let key = match (schema.is_empty(), name.is_empty()) {
                    (true, _) => name.to_string(),
                    (false, true) => schema.to_string(),
                    (false, false) => format!("{schema}.{name}"),
                };
                patterns.is_empty() || patterns.iter().any(|p| p.matches(&key))
            })
            .with_line_ending(common.rewrite_options().line_ending);
            run(&common, &action, true)
        }
        Commands::RenameIdentifiers {
            common,
            prefix,
            suffix,
            map,
        } => {
            init_tracing(common.verbose);
            let map: HashMap<String, String> = map.into_iter().collect();
            let action = IdentifierRenameAction::new(move |name| {
                map.get(name)
                    .cloned()
                    .unwrap_or_else(|| format!("{prefix}{name}{suffix}"))
            });
            run(&common, &action, true)
        }
        Commands::RenameProcedures {
            common,
            prefix,
            schema_map,
        } => {
            init_tracing(common.verbose);
            let schema_map: HashMap<String, String> = schema_map.into_iter().collect();
            let action = ProcedureNameRenameAction::new(move |schema, name| {
                let schema = schema_map
                    .get(schema)
                    .cloned()
                    .unwrap_or_else(|| schema.to_string());
                (schema, format!("{prefix}{name}"))
            });
            run(&common, &action, true)
        }
        Commands::Expand { common, env, set } => {
            init_tracing(common.verbose);
            let mut environment = match &env {
                Some(path) => {
                    let json = fs::read_to_string(path)
                        .with_context(|| format!("Failed to read environment file: {}", path.display()))?;
                    Environment::from_json_str(&json)?
                }
                None => Environment::new(),
            };
            environment.merge(Environment::from_pairs(&set)?);
            let action =
                ConditionalCommentsAction::new(environment).with_options(common.rewrite_options());
            run(&common, &action, true)
        }
        Commands::Check { common } => {
            init_tracing(common.verbose);
            run(&common, &IdentityAction, false)
        }
    }
}

/// Rewrite every input script in parallel and emit the results.
fn run(common: &CommonArgs, action: &dyn RewriteAction, emit_output: bool) -> Result<()> {
    let scripts = collect_scripts(&common.inputs)?;
    if scripts.is_empty() {
        bail!("No .sql files found");
    }
    if emit_output && common.out_dir.is_none() && scripts.len() > 1 {
        bail!("{} scripts found; use --out-dir to rewrite more than one", scripts.len());
    }

    let rewriter = ScriptRewriter::with_options(common.rewrite_options());
    info!(action = action.name(), scripts = scripts.len(), "rewriting");

    let results = scripts
        .par_iter()
        .map(|script| rewrite_file(&rewriter, action, script))
        .collect::<Vec<_>>();

    let mut failed = 0usize;
    for (script, result) in scripts.iter().zip(results) {
        let result = result?;
        for diagnostic in &result.diagnostics {
            warn!(file = %script.path.display(), "{diagnostic}");
        }
        if !result.is_ok() {
            failed += 1;
            for error in &result.errors {
                eprintln!("{}:{}", script.path.display(), error);
            }
            continue;
        }
        if !emit_output {
            continue;
        }
        match &common.out_dir {
            Some(out_dir) => write_output(out_dir, script, &result.output)?,
            None => print!("{}", result.output),
        }
    }

    if failed > 0 {
        bail!("{failed} script(s) have parse errors");
    }
    Ok(())
}

fn rewrite_file(
    rewriter: &ScriptRewriter,
    action: &dyn RewriteAction,
    script: &ScriptFile,
) -> Result<RewriteResult> {
    let sql = read_script(&script.path)?;
    rewriter
        .rewrite(&sql, action)
        .with_context(|| format!("Failed to rewrite {}", script.path.display()))
}

fn write_output(out_dir: &Path, script: &ScriptFile, output: &str) -> Result<()> {
    let target = out_dir.join(&script.relative_path);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(&target, output)
        .with_context(|| format!("Failed to write {}", target.display()))
}
