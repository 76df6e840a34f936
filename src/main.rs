use clap::{
    ArgAction, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use sportop::{
    cli, config,
    types::{Country, ResourceKind},
    warning,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the web server and the metrics server
    Serve(ServeOptions),

    /// Fetch top data once with an existing access token
    Fetch(FetchOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Open the authorization page in the default browser
    #[clap(long)]
    pub open: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct FetchOptions {
    /// Spotify access token
    #[clap(long, env = "SPOTIFY_ACCESS_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Market code(s) to fetch; defaults to SPORTOP_COUNTRIES
    #[clap(long = "country", action = ArgAction::Append, num_args = 1)]
    pub countries: Vec<String>,

    /// Resource kind(s) to fetch (track, artist, genre); defaults to all
    #[clap(
        long = "kind",
        value_parser = parse_kind,
        action = ArgAction::Append,
        num_args = 1
    )]
    pub kinds: Vec<ResourceKind>,

    /// Print the tables without writing CSV files
    #[clap(long)]
    pub no_write: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn parse_kind(s: &str) -> Result<ResourceKind, String> {
    s.parse()
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sportop=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment. Err: {}", e);
    }
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(opt) => cli::serve(opt.open).await,
        Command::Fetch(opt) => {
            let countries = opt
                .countries
                .iter()
                .flat_map(|raw| config::parse_countries(raw))
                .collect::<Vec<Country>>();
            cli::fetch(opt.token, countries, opt.kinds, !opt.no_write).await
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
