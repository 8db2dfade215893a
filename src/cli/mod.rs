//! # CLI Module
//!
//! Command implementations behind the `letterboxd-stats` flags. Each
//! command loads what it needs from the local export, calls TMDB or
//! Letterboxd where required and prints the result.
//!
//! ## Commands
//!
//! - [`download`] - `-d`: log in and fetch the account export
//! - [`search_person`] - `-s`: person search and filmography
//! - [`search_film`] - `-S`: film search, details, poster and your status
//! - [`view`] - `-W`, `-D`, `-R`: watchlist, diary and ratings tables
//! - [`lists`] - `-L`: list overview or one list with rating means
//!
//! ## Layering
//!
//! ```text
//! CLI Layer (this module)
//!     ↓
//! Management Layer (export CSV files)   Query Layer (filter/sort/limit)
//!     ↓
//! TMDB / Letterboxd clients
//!     ↓
//! Renderer (tables, grids, posters)
//! ```
//!
//! Commands return [`crate::Res`]; the binary turns an error into a red
//! message and exit status 1. Recoverable conditions such as an empty search
//! result only print a warning.

mod download;
mod lists;
mod search;
mod view;

use crate::query::{FilmSet, Query, SortKey, SortOrder};

pub use download::download;
pub use lists::lists;
pub use lists::list_entries;
pub use search::film_details;
pub use search::film_status;
pub use search::search_film;
pub use search::search_person;
pub use view::view;

/// Display options shared by the views, taken from the command line.
///
/// `None` fields fall back to the view's default sort and the configured
/// order.
#[derive(Debug, Clone, Default)]
pub struct ViewOptions {
    pub sort: Option<SortKey>,
    pub order: Option<SortOrder>,
    pub limit: Option<usize>,
    pub ratings: Vec<f32>,
    pub films: Option<FilmSet>,
}

impl ViewOptions {
    pub fn query(&self, default_sort: SortKey, default_order: SortOrder) -> Query {
        Query::new(
            self.sort.unwrap_or(default_sort),
            self.order.unwrap_or(default_order),
        )
        .with_limit(self.limit)
        .with_ratings(self.ratings.clone())
        .with_films(self.films.clone())
    }
}
