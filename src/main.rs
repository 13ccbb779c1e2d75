use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gh_factory::{Factory, utils};

#[derive(Parser)]
#[command(name = "gh-factory")]
#[command(about = "Inspect the runtime context shared by git hosting commands")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resolved configuration hosts, remotes, base repository and branch
    Context {
        /// Exit with an error when the base repository or branch cannot be resolved
        #[arg(long)]
        strict: bool,
    },
    /// Print the executable path commands should use to re-invoke this tool
    Executable,
}

fn main() -> Result<()> {
    utils::logging::init();
    let cli = Cli::parse();
    let factory = Factory::new(env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Context { strict } => {
            utils::print_context(&factory);
            if strict {
                factory
                    .base_repo()
                    .context("Failed to resolve base repository")?;
                factory.branch().context("Failed to resolve branch")?;
            }
        }
        Commands::Executable => println!("{}", factory.executable().display()),
    }
    Ok(())
}
