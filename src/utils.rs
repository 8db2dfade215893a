use std::{path::PathBuf, time::Duration};

use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};

/// Expands a leading `~` to the user's home directory.
///
/// Only the start of the path is expanded; `~` elsewhere is kept as is.
pub fn expand_tilde(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path.trim()).into_owned())
}

/// Parses a TMDB `YYYY-MM-DD` date. TMDB sends an empty string for unknown dates.
pub fn parse_date(date: Option<&str>) -> Option<NaiveDate> {
    date.map(str::trim)
        .filter(|d| !d.is_empty())
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

pub fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub fn fmt_year(year: Option<i32>) -> String {
    year.map(|y| y.to_string()).unwrap_or_default()
}

/// Formats a star rating: whole stars without decimals, halves with one.
pub fn fmt_rating(rating: Option<f32>) -> String {
    match rating {
        Some(r) if r.fract() == 0.0 => format!("{:.0}", r),
        Some(r) => format!("{:.1}", r),
        None => String::new(),
    }
}

pub fn fmt_runtime(runtime: Option<u32>) -> String {
    match runtime {
        Some(0) | None => String::new(),
        Some(minutes) => format!("{} min", minutes),
    }
}

/// Lowercases a title and collapses whitespace so export and TMDB titles compare equal.
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Extracts the file name from a `Content-Disposition` header value.
///
/// ```
/// assert_eq!(
///     filename_from_content_disposition("attachment; filename=\"export.zip\""),
///     Some("export.zip".to_string())
/// );
/// ```
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|name| !name.is_empty())
}

/// Extracts a TMDB movie id from a link like `https://www.themoviedb.org/movie/603/`.
///
/// Links to TV shows or other categories yield `None`.
pub fn tmdb_movie_id_from_href(href: &str) -> Option<u64> {
    let segments: Vec<&str> = href.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [.., category, id] if *category == "movie" => id.parse().ok(),
        _ => None,
    }
}

/// Spinner shown while a network phase is running.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
