//! # Letterboxd Module
//!
//! Cookie-based session against letterboxd.com. Letterboxd has no public
//! API, so everything here talks to the web site the way a browser does:
//!
//! - [`LetterboxdSession::login`] posts the login form with the CSRF token
//!   the site puts in a cookie on the first page load.
//! - [`LetterboxdSession::download_export`] fetches the account export ZIP
//!   and extracts it into the local export folder.
//! - [`LetterboxdSession::film_tmdb_id`] reads the TMDB link off a film
//!   page, which is how list entries are tied to TMDB runtimes.
//! - [`LetterboxdSession::film_user_status`] reads the logged-in user's live
//!   watched, liked, watchlist and rating state for a film. Nothing is ever
//!   written back to the account.
//!
//! The base URL is injectable so tests can run against a local server.

mod auth;
mod export;
mod film;

pub use auth::DEFAULT_BASE_URL;
pub use auth::LetterboxdSession;
pub use film::letterboxd_url_for_tmdb;
pub use film::parse_film_uid;
pub use film::parse_tmdb_id;
