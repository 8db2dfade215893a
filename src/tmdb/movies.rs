use crate::{
    Error, Res,
    types::{MovieDetails, MovieSummary, SearchResponse},
};

use super::TmdbClient;

#[derive(serde::Deserialize)]
struct RuntimeOnly {
    #[serde(default)]
    runtime: Option<u32>,
}

impl TmdbClient {
    /// Searches films by title, most relevant first.
    ///
    /// # Arguments
    ///
    /// * `query` - Title or part of a title
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(Vec<MovieSummary>)` - Candidates; no match is an empty vector, not an error
    /// - `Err(Error::Api)` - TMDB answered with a non-2xx status
    /// - `Err(Error::Network)` - TMDB could not be reached
    pub async fn search_movies(&self, query: &str) -> Res<Vec<MovieSummary>> {
        let response: SearchResponse<MovieSummary> = self
            .get_json("/search/movie", &[("query", query), ("include_adult", "false")])
            .await?;

        tracing::info!(
            %query,
            results = response.results.len(),
            total = response.total_results,
            "movie search"
        );
        Ok(response.results)
    }

    /// Film details with cast and crew appended.
    ///
    /// # Arguments
    ///
    /// * `id` - TMDB movie id
    ///
    /// # Returns
    ///
    /// Returns the details, or `Err(Error::Api { status: 404, .. })` for an
    /// unknown id.
    pub async fn movie_details(&self, id: u64) -> Res<MovieDetails> {
        self.get_json(
            &format!("/movie/{}", id),
            &[("append_to_response", "credits")],
        )
        .await
    }

    /// Runtime in minutes. A film TMDB does not know yields `None`.
    pub async fn movie_runtime(&self, id: u64) -> Res<Option<u32>> {
        match self
            .get_json::<RuntimeOnly>(&format!("/movie/{}", id), &[])
            .await
        {
            Ok(movie) => Ok(movie.runtime.filter(|r| *r > 0)),
            Err(Error::Api { status: 404, .. }) => {
                tracing::debug!(id, "movie not found on TMDB");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
