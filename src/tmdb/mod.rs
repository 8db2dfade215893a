//! # TMDB Integration Module
//!
//! Thin client for The Movie Database v3 JSON API. It is used to search
//! people and films and to fetch the details that the Letterboxd export
//! lacks: runtimes, credits, genres and poster images.
//!
//! ## Overview
//!
//! ```text
//! CLI Layer (search, lists)
//!          ↓
//! TmdbClient
//!     ├── Movies (search, details, runtime)
//!     └── People (search, details, movie credits)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! api.themoviedb.org/3
//! ```
//!
//! Every request carries the `api_key` query parameter from the `[TMDB]`
//! section of the configuration. A non-2xx answer becomes
//! [`crate::Error::Api`] with the HTTP status; nothing is retried.
//!
//! Metadata is fetched fresh for every query and never persisted.

mod client;
mod movies;
mod people;

pub use client::DEFAULT_API_URL;
pub use client::POSTER_BASE_URL;
pub use client::TmdbClient;
pub use client::poster_url;
pub use people::ACTING;
pub use people::departments;
pub use people::filmography;
