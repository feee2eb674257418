use crate::demo::{run_demo, run_recommend, run_search, DemoArgs, RecommendArgs, SearchArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use eu_admit::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "EU Admit",
    about = "Search EU universities, rank them against your preferences, and track applications",
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
    /// Keyword and filter search over the catalog
    Search(SearchArgs),
    /// Rank universities against a set of preferences
    Recommend(RecommendArgs),
    /// Walk through onboarding, shortlisting, and the dashboard on the demo catalog
    Demo(DemoArgs),
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
        Command::Search(args) => run_search(args),
        Command::Recommend(args) => run_recommend(args),
        Command::Demo(args) => run_demo(args),
    }
}
