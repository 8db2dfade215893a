use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::utils;

/// One row of a Letterboxd export CSV.
///
/// The same struct reads every export file; columns absent from a file stay
/// `None`. List files name the URL column `URL` instead of `Letterboxd URI`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    #[serde(rename = "Date", default)]
    pub date: Option<NaiveDate>,
    #[serde(rename = "Name")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: Option<i32>,
    #[serde(rename = "Letterboxd URI", alias = "URL", default)]
    pub url: String,
    #[serde(rename = "Rating", default)]
    pub rating: Option<f32>,
    #[serde(rename = "Rewatch", default)]
    pub rewatch: Option<String>,
    #[serde(rename = "Tags", default)]
    pub tags: Option<String>,
    #[serde(rename = "Watched Date", default)]
    pub watched_date: Option<NaiveDate>,
    #[serde(rename = "Position", default)]
    pub position: Option<u32>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
}

impl ActivityRecord {
    pub fn is_rewatch(&self) -> bool {
        self.rewatch
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case("yes"))
    }
}

/// Header block of an exported list file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListMeta {
    #[serde(rename = "Date", default)]
    pub date: Option<NaiveDate>,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Tags", default)]
    pub tags: Option<String>,
    #[serde(rename = "URL", default)]
    pub url: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LetterboxdList {
    pub meta: ListMeta,
    pub path: PathBuf,
    pub entries: Vec<ActivityRecord>,
}

/// A list entry joined with the user's rating and, on request, the TMDB runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    pub record: ActivityRecord,
    pub runtime: Option<u32>,
}

/// A film in a person's filmography, merged across jobs.
#[derive(Debug, Clone, PartialEq)]
pub struct FilmCredit {
    pub id: u64,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub jobs: Vec<String>,
    pub watched: Option<bool>,
    pub rating: Option<f32>,
    pub runtime: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub result: String,
    #[serde(default)]
    pub messages: Vec<String>,
}

/// Answer of the `/ajax/letterboxd-metadata/` endpoint for one film.
///
/// Only the fields describing the logged-in user's relation to the film are
/// read. `filmsInWatchlist` comes as a list of film ids or a flag depending
/// on the page, hence the untyped value.
#[derive(Debug, Clone, Deserialize)]
pub struct FilmMetadataResponse {
    #[serde(default)]
    pub result: bool,
    #[serde(default)]
    pub watchables: Vec<Watchable>,
    #[serde(default)]
    pub likeables: Vec<Likeable>,
    #[serde(default)]
    pub rateables: Vec<Rateable>,
    #[serde(rename = "filmsInWatchlist", default)]
    pub films_in_watchlist: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Watchable {
    #[serde(default)]
    pub watched: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Likeable {
    #[serde(default)]
    pub liked: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rateable {
    /// Half stars, 1 to 10.
    pub rating: Option<u8>,
}

/// The logged-in user's live status for a film on Letterboxd.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilmUserStatus {
    pub watched: bool,
    pub liked: bool,
    pub watchlisted: bool,
    /// Star rating, 0.5 to 5.
    pub rating: Option<f32>,
}

impl From<&FilmMetadataResponse> for FilmUserStatus {
    fn from(meta: &FilmMetadataResponse) -> Self {
        let watchlisted = match &meta.films_in_watchlist {
            serde_json::Value::Bool(b) => *b,
            serde_json::Value::Array(ids) => !ids.is_empty(),
            serde_json::Value::Object(map) => !map.is_empty(),
            serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            serde_json::Value::String(s) => !s.is_empty(),
            serde_json::Value::Null => false,
        };

        FilmUserStatus {
            watched: meta.watchables.iter().any(|w| w.watched),
            liked: meta.likeables.iter().any(|l| l.liked),
            watchlisted,
            rating: meta
                .rateables
                .iter()
                .find_map(|r| r.rating)
                .filter(|r| *r > 0)
                .map(|r| r as f32 / 2.0),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse<T> {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_results: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonSummary {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub known_for_department: Option<String>,
    #[serde(default)]
    pub popularity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub popularity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonDetails {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub known_for_department: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub place_of_birth: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovieCredits {
    #[serde(default)]
    pub cast: Vec<CastCredit>,
    #[serde(default)]
    pub crew: Vec<CrewCredit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastCredit {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub character: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewCredit {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub job: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub credits: Option<Credits>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewMember {
    pub name: String,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub department: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub status_message: Option<String>,
}

#[derive(Tabled)]
pub struct DiaryTableRow {
    #[tabled(rename = "Watched Date")]
    pub watched_date: String,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Year")]
    pub year: String,
    #[tabled(rename = "Rating")]
    pub rating: String,
    #[tabled(rename = "Rewatch")]
    pub rewatch: String,
    #[tabled(rename = "Url")]
    pub url: String,
}

impl From<&ActivityRecord> for DiaryTableRow {
    fn from(r: &ActivityRecord) -> Self {
        Self {
            watched_date: utils::fmt_date(r.watched_date.or(r.date)),
            title: r.title.clone(),
            year: utils::fmt_year(r.year),
            rating: utils::fmt_rating(r.rating),
            rewatch: if r.is_rewatch() { "Yes".into() } else { String::new() },
            url: r.url.clone(),
        }
    }
}

#[derive(Tabled)]
pub struct WatchlistTableRow {
    #[tabled(rename = "Date Added")]
    pub date: String,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Year")]
    pub year: String,
    #[tabled(rename = "Url")]
    pub url: String,
}

impl From<&ActivityRecord> for WatchlistTableRow {
    fn from(r: &ActivityRecord) -> Self {
        Self {
            date: utils::fmt_date(r.date),
            title: r.title.clone(),
            year: utils::fmt_year(r.year),
            url: r.url.clone(),
        }
    }
}

#[derive(Tabled)]
pub struct RatingTableRow {
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Year")]
    pub year: String,
    #[tabled(rename = "Rating")]
    pub rating: String,
    #[tabled(rename = "Url")]
    pub url: String,
}

impl From<&ActivityRecord> for RatingTableRow {
    fn from(r: &ActivityRecord) -> Self {
        Self {
            date: utils::fmt_date(r.date),
            title: r.title.clone(),
            year: utils::fmt_year(r.year),
            rating: utils::fmt_rating(r.rating),
            url: r.url.clone(),
        }
    }
}

#[derive(Tabled)]
pub struct ListEntryTableRow {
    #[tabled(rename = "#")]
    pub position: String,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Year")]
    pub year: String,
    #[tabled(rename = "Rating")]
    pub rating: String,
    #[tabled(rename = "Runtime")]
    pub runtime: String,
    #[tabled(rename = "Url")]
    pub url: String,
}

impl From<&ListEntry> for ListEntryTableRow {
    fn from(e: &ListEntry) -> Self {
        Self {
            position: e.record.position.map(|p| p.to_string()).unwrap_or_default(),
            title: e.record.title.clone(),
            year: utils::fmt_year(e.record.year),
            rating: utils::fmt_rating(e.record.rating),
            runtime: utils::fmt_runtime(e.runtime),
            url: e.record.url.clone(),
        }
    }
}

#[derive(Tabled)]
pub struct ListSummaryTableRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Films")]
    pub films: usize,
    #[tabled(rename = "Created")]
    pub date: String,
    #[tabled(rename = "File")]
    pub file: String,
}

#[derive(Tabled)]
pub struct FilmographyTableRow {
    #[tabled(rename = "Watched")]
    pub watched: String,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Release Date")]
    pub release_date: String,
    #[tabled(rename = "Job")]
    pub job: String,
    #[tabled(rename = "Rating")]
    pub rating: String,
    #[tabled(rename = "Runtime")]
    pub runtime: String,
}

impl From<&FilmCredit> for FilmographyTableRow {
    fn from(c: &FilmCredit) -> Self {
        Self {
            watched: match c.watched {
                Some(true) => "[X]".into(),
                Some(false) => "[ ]".into(),
                None => String::new(),
            },
            title: c.title.clone(),
            release_date: utils::fmt_date(c.release_date),
            job: c.jobs.join(", "),
            rating: utils::fmt_rating(c.rating),
            runtime: utils::fmt_runtime(c.runtime),
        }
    }
}

#[derive(Tabled)]
pub struct FilmCandidateTableRow {
    #[tabled(rename = "#")]
    pub rank: usize,
    #[tabled(rename = "TMDB Id")]
    pub id: u64,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Release Date")]
    pub release_date: String,
}

#[derive(Tabled)]
pub struct PersonCandidateTableRow {
    #[tabled(rename = "#")]
    pub rank: usize,
    #[tabled(rename = "TMDB Id")]
    pub id: u64,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Known For")]
    pub known_for: String,
}
