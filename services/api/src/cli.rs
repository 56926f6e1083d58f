use crate::demo::{run_assess, run_demo, run_registry_import, AssessArgs, DemoArgs, ImportArgs};
use crate::server;
use ai_intake::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "AI Governance Intake",
    about = "Run the AI governance intake service or tier AI systems from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Compute the risk tier for one set of data-handling answers
    Assess(AssessArgs),
    /// Work with the use-case registry
    Registry {
        #[command(subcommand)]
        command: RegistryCommand,
    },
    /// Walk one intake through the wizard and print what the engine derives
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum RegistryCommand {
    /// Tier every row of an inventory CSV export
    Import(ImportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assess(args) => run_assess(args),
        Command::Registry {
            command: RegistryCommand::Import(args),
        } => run_registry_import(args),
        Command::Demo(args) => run_demo(args),
    }
}
