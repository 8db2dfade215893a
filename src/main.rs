use clap::{
    ArgAction, CommandFactory, Parser,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use letterboxd_stats::{
    Res,
    cli::{self, ViewOptions},
    config::{self, Config},
    error,
    letterboxd::LetterboxdSession,
    management::{ExportKind, ExportManager},
    query::{SortKey, SortOrder},
    render::Renderer,
    tmdb::TmdbClient,
    utils,
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
    /// Search for a person and show their filmography
    #[clap(short = 's', long, value_name = "NAME")]
    search_person: Option<String>,

    /// Search for a film and show its details
    #[clap(short = 'S', long, value_name = "TITLE")]
    search_film: Option<String>,

    /// Download and extract your Letterboxd data
    #[clap(short = 'd', long)]
    download: bool,

    /// Show your watchlist
    #[clap(short = 'W', long)]
    watchlist: bool,

    /// Show your diary
    #[clap(short = 'D', long)]
    diary: bool,

    /// Show your ratings
    #[clap(short = 'R', long)]
    ratings: bool,

    /// Show your lists, or one list with --list
    #[clap(short = 'L', long)]
    lists: bool,

    /// Keep at most this many rows
    #[clap(short = 'l', long, value_name = "N")]
    limit: Option<usize>,

    /// Folder holding config.toml
    #[clap(short = 'c', long, value_name = "DIR")]
    config_folder: Option<String>,

    /// Sort key: date, watched-date, rating, title, year, position, runtime or shuffle
    #[clap(long, value_name = "KEY")]
    sort: Option<SortKey>,

    /// Sort ascending
    #[clap(long, conflicts_with = "descending")]
    ascending: bool,

    /// Sort descending
    #[clap(long)]
    descending: bool,

    /// Keep only rows with this rating; can be repeated
    #[clap(long, value_name = "R", action = ArgAction::Append)]
    rating: Vec<f32>,

    /// Department of the person's filmography (e.g. Directing, Writing)
    #[clap(long, value_name = "DEPT")]
    department: Option<String>,

    /// Which search candidate to expand, starting at 1
    #[clap(long, value_name = "N", default_value_t = 1)]
    pick: usize,

    /// Name of the list to open with -L
    #[clap(long, value_name = "NAME")]
    list: Option<String>,

    /// Do not print posters
    #[clap(long)]
    no_poster: bool,

    /// More log output (-v info, -vv debug)
    #[clap(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// Print shell completions
    #[clap(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

impl Cli {
    fn order(&self) -> Option<SortOrder> {
        match (self.ascending, self.descending) {
            (true, _) => Some(SortOrder::Ascending),
            (_, true) => Some(SortOrder::Descending),
            _ => None,
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("LBSTATS_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    if std::env::args_os().len() <= 1 {
        let _ = Cli::command().print_help();
        println!();
        return;
    }

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    if let Err(e) = run(cli).await {
        if e.is_user_error() {
            error!("{}\nCheck config.toml or pass another folder with -c.", e);
        }
        error!("{}", e);
    }
}

async fn run(cli: Cli) -> Res<()> {
    let folder = match &cli.config_folder {
        Some(folder) => utils::expand_tilde(folder),
        None => config::default_config_dir()?,
    };
    config::load_env(&folder);
    let config = Config::load(&folder).await?;

    let exports = ExportManager::new(config.exports_folder());
    let renderer = Renderer::new(config.cli.poster_columns);
    let tmdb = TmdbClient::new(&config.tmdb.api_key);
    let mut session = LetterboxdSession::new()?;

    let mut opts = ViewOptions {
        sort: cli.sort,
        order: cli.order(),
        limit: cli.limit,
        ratings: cli.rating.clone(),
        films: None,
    };

    if cli.download {
        cli::download(&config, &mut session).await?;
    }

    if let Some(name) = &cli.search_person {
        let films = cli::search_person(
            &config,
            &tmdb,
            &exports,
            &renderer,
            name,
            cli.department.as_deref(),
            cli.pick,
            &opts,
        )
        .await?;
        // Nobody found means no film can match either.
        opts.films = Some(films.unwrap_or_default());
    }

    if let Some(title) = &cli.search_film {
        cli::search_film(
            &config,
            &tmdb,
            &exports,
            &renderer,
            &mut session,
            title,
            cli.pick,
            !cli.no_poster,
        )
        .await?;
    }

    for (requested, kind) in [
        (cli.watchlist, ExportKind::Watchlist),
        (cli.diary, ExportKind::Diary),
        (cli.ratings, ExportKind::Ratings),
    ] {
        if requested {
            cli::view(&config, &exports, &renderer, kind, &opts).await?;
        }
    }

    if cli.lists {
        cli::lists(
            &config,
            &exports,
            &renderer,
            &tmdb,
            &session,
            cli.list.as_deref(),
            &opts,
        )
        .await?;
    }

    Ok(())
}
