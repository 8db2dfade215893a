use reqwest::StatusCode;
use scraper::{Html, Selector};

use crate::{
    Error, Res,
    types::{FilmMetadataResponse, FilmUserStatus},
    utils,
};

use super::LetterboxdSession;

const TMDB_LINK: &str = "a[data-track-action='TMDb']";

const RATEABLE_FORM: &str = "#frm-sidebar-rating[data-rateable-uid]";

const METADATA_PATH: &str = "/ajax/letterboxd-metadata/";

impl LetterboxdSession {
    /// TMDB movie id linked from a Letterboxd film page.
    ///
    /// Accepts absolute URLs (as found in the export) or paths relative to
    /// the session's base URL. Pages linking to a TV entry yield `None`.
    pub async fn film_tmdb_id(&self, film_url: &str) -> Res<Option<u64>> {
        let url = self.url(film_url)?;
        tracing::debug!(%url, "fetching film page");

        let html = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_tmdb_id(&html)
    }

    /// Reads the logged-in user's live status for a film.
    ///
    /// Letterboxd resolves `/tmdb/<id>/` to the film page. The film's internal
    /// id is then read off the user sidebar and sent to the metadata endpoint,
    /// which answers with the watched, liked, watchlist and rating state.
    /// Unlike the export, this includes whether the film is liked.
    ///
    /// # Arguments
    ///
    /// * `tmdb_id` - TMDB movie id of the film
    ///
    /// # Returns
    ///
    /// - `Ok(Some(status))` - The user's current status for the film
    /// - `Ok(None)` - Letterboxd has no film for this TMDB id
    ///
    /// # Errors
    ///
    /// [`Error::Auth`] when the session is not logged in, and
    /// [`Error::UnexpectedResponse`] when a page lacks the expected markup or
    /// the metadata answer reports a failure.
    pub async fn film_user_status(&self, tmdb_id: u64) -> Res<Option<FilmUserStatus>> {
        if !self.logged_in() {
            return Err(Error::Auth(
                "log in before reading a film's status".to_string(),
            ));
        }

        let Some(slug) = self.film_slug(tmdb_id).await? else {
            tracing::debug!(tmdb_id, "no Letterboxd film for TMDB id");
            return Ok(None);
        };

        let sidebar = self.url(&format!(
            "/csi/film/{}/sidebar-user-actions/?esiAllowUser=true",
            slug
        ))?;
        let html = self
            .http
            .get(sidebar.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let film_id = parse_film_uid(&html)?.ok_or_else(|| Error::UnexpectedResponse {
            url: sidebar.to_string(),
            reason: "no rateable film id on the page".to_string(),
        })?;

        let uid = format!("film:{}", film_id);
        let url = self.url(METADATA_PATH)?;
        let form = ["posters", "likeables", "watchables", "ratables"].map(|key| (key, uid.as_str()));
        let body = self
            .http
            .post(url.clone())
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let meta: FilmMetadataResponse =
            serde_json::from_str(&body).map_err(|e| Error::UnexpectedResponse {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        if !meta.result {
            return Err(Error::UnexpectedResponse {
                url: url.to_string(),
                reason: "the metadata request reported a failure".to_string(),
            });
        }

        let status = FilmUserStatus::from(&meta);
        tracing::info!(%slug, ?status, "fetched film status");
        Ok(Some(status))
    }

    /// Slug of the film page `/tmdb/<id>/` redirects to.
    async fn film_slug(&self, tmdb_id: u64) -> Res<Option<String>> {
        let url = self.url(&format!("/tmdb/{}/", tmdb_id))?;
        let response = self.http.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response.error_for_status()?;
        Ok(film_slug_from_path(response.url().path()))
    }
}

pub fn parse_tmdb_id(html: &str) -> Res<Option<u64>> {
    let selector = Selector::parse(TMDB_LINK).map_err(|e| Error::Other(e.to_string()))?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .find_map(utils::tmdb_movie_id_from_href))
}

/// Letterboxd's internal film id from the rating form of a film sidebar.
///
/// The form carries it as `data-rateable-uid="film:<id>"`.
pub fn parse_film_uid(html: &str) -> Res<Option<String>> {
    let selector = Selector::parse(RATEABLE_FORM).map_err(|e| Error::Other(e.to_string()))?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&selector)
        .filter_map(|form| form.value().attr("data-rateable-uid"))
        .find_map(|uid| uid.split_once(':').map(|(_, id)| id.to_string()))
        .filter(|id| !id.is_empty()))
}

fn film_slug_from_path(path: &str) -> Option<String> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        ["film", slug, ..] => Some(slug.to_string()),
        _ => None,
    }
}

pub fn letterboxd_url_for_tmdb(id: u64) -> String {
    format!("https://letterboxd.com/tmdb/{}/", id)
}
