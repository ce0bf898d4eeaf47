use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod context;
mod format;
mod logging;

use commands::RegistryArgs;
use format::OutputFormat;

/// Replica - Registry Replication Tool
///
/// Runs replication jobs and destination-registry operations by hand.
#[derive(Parser, Debug)]
#[command(name = "replica")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to the configuration file
    #[arg(long, global = true, env = "REPLICA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Display version information
    Version,
    /// Delete a repository, or some of its tags, on a destination registry
    Delete {
        /// Repository path (namespace/repo)
        repository: String,
        /// Tags to delete; none deletes the whole repository
        tags: Vec<String>,
        #[command(flatten)]
        registry: RegistryArgs,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
    /// Create a project (or namespace) on a destination registry
    CreateProject {
        /// Project name
        name: String,
        /// Make the project publicly readable
        #[arg(long)]
        public: bool,
        #[command(flatten)]
        registry: RegistryArgs,
    },
    /// List tags of a repository
    Tags {
        /// Repository name
        repository: String,
        #[command(flatten)]
        registry: RegistryArgs,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
        /// Show only tag names
        #[arg(short, long)]
        quiet: bool,
    },
    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let verbosity = context::VerbosityLevel::from_count(cli.verbose);
    logging::init(verbosity);

    let ctx = match context::AppContext::build(cli.config) {
        Ok(ctx) => ctx,
        Err(e) => {
            format::error(&e);
            std::process::exit(1);
        }
    };
    if let Some(path) = &ctx.config_path {
        tracing::info!("using configuration from {}", path.display());
    }

    match cli.command {
        Commands::Version => {
            commands::version::print_version();
        }
        Commands::Delete {
            repository,
            tags,
            registry,
            format,
        } => {
            commands::delete::handle_delete(&ctx, &repository, tags, &registry, format).await;
        }
        Commands::CreateProject {
            name,
            public,
            registry,
        } => {
            commands::project::handle_create_project(&ctx, &name, public, &registry).await;
        }
        Commands::Tags {
            repository,
            registry,
            format,
            quiet,
        } => {
            commands::tags::handle_tags(&ctx, &repository, &registry, format, quiet).await;
        }
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
        }
    }
}
