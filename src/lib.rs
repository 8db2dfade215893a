//! Letterboxd Stats CLI Library
//!
//! This library lets a Letterboxd user inspect their exported activity (diary,
//! watchlist, ratings, lists) and search films and people, enriching the data
//! with metadata from The Movie Database (TMDB).
//!
//! # Modules
//!
//! - `cli` - Command implementations invoked by the binary
//! - `config` - `config.toml` loading, defaults and environment overrides
//! - `error` - Crate-wide error type
//! - `letterboxd` - Authenticated Letterboxd session, export download, film pages
//! - `management` - Reading the exported CSV files from the root folder
//! - `query` - Filtering, sorting and limiting of records
//! - `render` - Tables, key/value grids and ASCII posters
//! - `tmdb` - TMDB v3 API client
//! - `types` - Data structures and table rows
//! - `utils` - Small parsing and formatting helpers

pub mod cli;
pub mod config;
pub mod error;
pub mod letterboxd;
pub mod management;
pub mod query;
pub mod render;
pub mod tmdb;
pub mod types;
pub mod utils;

pub use error::Error;

/// A convenient Result type alias for operations that may fail.
///
/// Every fallible operation in the crate returns [`Error`], so callers can
/// tell configuration, authentication, network and local I/O failures apart.
pub type Res<T> = std::result::Result<T, Error>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Searching TMDB for '{}'", query);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Data successfully downloaded in {}", path.display());
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Terminates with exit code 1 right after printing. Only `main` uses it;
/// library code returns [`Error`] instead.
///
/// # Example
///
/// ```
/// error!("{}", err);
/// // Program exits here
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable conditions such as an empty search result or a
/// missing optional export file.
///
/// # Example
///
/// ```
/// warning!("No results found for '{}'", query);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
