use anyhow::{bail, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod backup;
mod commands;
mod config;
mod prompt;

/// Structural patcher for bundled JavaScript CLI files.
///
/// ccpatch parses a bundled JavaScript file, rewrites a few well-known code
/// shapes and writes the file back. A timestamped backup is taken first, and
/// the file is only rewritten when a patch actually changed something.
///
/// PATCHES:
///     validationPatch      Skip model name validation
///     contextLowPatch      Remove the context-low warning
///     escInterruptPatch    Remove the "esc to interrupt" hint
///
/// EXAMPLES:
///     ccpatch /path/to/cli.js                          Apply the configured patches
///     ccpatch -p validationPatch cli.js                Apply only the validation patch
///     ccpatch -p validationPatch,contextLowPatch cli.js
///     ccpatch cli.js --dry-run                         Show what would change
///     ccpatch config                                   Choose patches and a default path
///     ccpatch restore /path/to/cli.js                  Restore an earlier backup
///
/// ENVIRONMENT VARIABLES:
///     CCPATCH_HOME      Configuration directory (default: ~/.ccpatch)
///     CCPATCH_LOG       Log filter, e.g. 'debug' or 'ccpatch_core=info'
///     CCPATCH_JSON      Set to '1' for JSON output by default
///     NO_COLOR          Set to disable colored output
#[derive(Parser, Debug)]
#[command(name = "ccpatch")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    apply: ApplyOpts,
}

#[derive(Args, Debug)]
struct ApplyOpts {
    /// File to patch (defaults to the configured path)
    file: Option<PathBuf>,
    /// Patches to apply instead of the configured ones (repeatable, comma-separated)
    #[arg(short = 'p', long = "patches", value_name = "PATCH", value_delimiter = ',')]
    patches: Vec<String>,
    /// Do not back up the file before writing
    #[arg(long)]
    no_backup: bool,
    /// Report what would change without writing anything
    #[arg(long)]
    dry_run: bool,
    /// Print the per-patch report as JSON
    #[arg(long, env = "CCPATCH_JSON")]
    json: bool,
    /// Verbose output
    #[arg(long, short = 'v', conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet output (errors only)
    #[arg(long, short = 'q')]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Choose the enabled patches and the default file path
    ///
    /// Opens an interactive menu. Enter patch numbers (several separated by
    /// commas) to toggle them, or use a shortcut.
    ///
    /// SHORTCUTS:
    ///     0    Save and exit
    ///     q    Exit without saving
    ///     a    Enable all patches
    ///     n    Disable all patches
    ///     r    Invert the selection
    #[command(visible_alias = "c")]
    Config,

    /// Restore a file from one of its backups
    ///
    /// Lists the backups of the file, newest first, and restores the chosen
    /// one after confirmation.
    ///
    /// EXAMPLES:
    ///     ccpatch restore                   Restore the configured file
    ///     ccpatch restore /path/to/cli.js   Restore a specific file
    Restore {
        /// File to restore (defaults to the configured path)
        file: Option<PathBuf>,
    },

    /// List the available patches and whether they are enabled
    #[command(visible_alias = "ls")]
    List,

    /// Generate shell completions
    ///
    /// EXAMPLES:
    ///     ccpatch completions bash > ~/.bash_completions/ccpatch.bash
    ///     ccpatch completions zsh > ~/.zfunc/_ccpatch
    ///     ccpatch completions fish > ~/.config/fish/completions/ccpatch.fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing(cli_config: &config::Config, opts: &ApplyOpts) {
    let filter = match &cli_config.log_filter {
        Some(directive) => EnvFilter::new(directive),
        None if opts.verbose => {
            EnvFilter::new("warn,ccpatch=debug,ccpatch_core=debug,ccpatch_config=debug")
        }
        None if opts.quiet => EnvFilter::new("error"),
        None => EnvFilter::new("warn"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cli_config = config::Config::from_env();

    if cli_config.no_color {
        colored::control::set_override(false);
    }
    init_tracing(&cli_config, &cli.apply);

    let Some(command) = cli.command else {
        let opts = cli.apply;
        let verbosity = if opts.quiet {
            commands::apply::Verbosity::Quiet
        } else if opts.verbose {
            commands::apply::Verbosity::Verbose
        } else {
            commands::apply::Verbosity::Normal
        };
        let args = commands::apply::ApplyArgs {
            file: opts.file,
            patches: opts.patches,
            backup: !opts.no_backup,
            dry_run: opts.dry_run,
            json: opts.json,
            verbosity,
        };
        return commands::apply::run(args, &cli_config.store()?);
    };

    match command {
        Commands::Config => {
            commands::configure::run(&cli_config.store()?)?;
        }
        Commands::Restore { file } => {
            let store = cli_config.store()?;
            let target = match file {
                Some(file) => file,
                None => match store.load()?.config.cli_path {
                    Some(path) => PathBuf::from(path),
                    None => bail!(
                        "No file to restore. Pass a path (ccpatch restore <file>) \
                         or set a default path with 'ccpatch config'"
                    ),
                },
            };
            let target = std::path::absolute(&target)?;
            let backups = backup::BackupStore::new(store.backup_dir());
            commands::restore::run(&backups, &target)?;
        }
        Commands::List => {
            commands::list::run(&cli_config.store()?)?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
        }
    }

    Ok(())
}
