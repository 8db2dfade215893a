use crate::{
    Res,
    types::{FilmCredit, MovieCredits, PersonDetails, PersonSummary, SearchResponse},
    utils,
};

use super::TmdbClient;

/// Department whose filmography is read from the cast instead of the crew.
pub const ACTING: &str = "Acting";

impl TmdbClient {
    /// Searches people by name, most popular first.
    ///
    /// # Arguments
    ///
    /// * `query` - Name or part of a name
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(Vec<PersonSummary>)` - Matching people, empty when nobody matches
    /// - `Err(Error::Api)` - TMDB answered with a non-2xx status, e.g. a bad API key
    /// - `Err(Error::Network)` - TMDB could not be reached
    ///
    /// # Example
    ///
    /// ```
    /// let people = tmdb.search_people("Akira Kurosawa").await?;
    /// let credits = tmdb.person_movie_credits(people[0].id).await?;
    /// ```
    pub async fn search_people(&self, query: &str) -> Res<Vec<PersonSummary>> {
        let response: SearchResponse<PersonSummary> = self
            .get_json("/search/person", &[("query", query), ("include_adult", "false")])
            .await?;

        tracing::info!(
            %query,
            results = response.results.len(),
            total = response.total_results,
            "person search"
        );
        Ok(response.results)
    }

    /// Name, known-for department, birthday and place of birth of a person.
    pub async fn person_details(&self, id: u64) -> Res<PersonDetails> {
        self.get_json(&format!("/person/{}", id), &[]).await
    }

    /// Every movie credit of a person, as cast and as crew.
    ///
    /// Pass the result to [`filmography`] to get one department's films.
    pub async fn person_movie_credits(&self, id: u64) -> Res<MovieCredits> {
        self.get_json(&format!("/person/{}/movie_credits", id), &[])
            .await
    }
}

/// Builds the filmography of one department from a person's movie credits.
///
/// `Acting` reads the cast, with the character as the job. Every other
/// department reads the crew entries of that department. A film credited
/// several times appears once with all its jobs, in release date order.
pub fn filmography(credits: &MovieCredits, department: &str) -> Vec<FilmCredit> {
    let mut films: Vec<FilmCredit> = Vec::new();

    let mut add = |id: u64, title: &str, release_date: Option<&str>, job: String| {
        if let Some(film) = films.iter_mut().find(|f| f.id == id) {
            if !job.is_empty() && !film.jobs.contains(&job) {
                film.jobs.push(job);
            }
            return;
        }
        films.push(FilmCredit {
            id,
            title: title.to_string(),
            release_date: utils::parse_date(release_date),
            jobs: if job.is_empty() { Vec::new() } else { vec![job] },
            watched: None,
            rating: None,
            runtime: None,
        });
    };

    if department.eq_ignore_ascii_case(ACTING) {
        for credit in &credits.cast {
            add(
                credit.id,
                &credit.title,
                credit.release_date.as_deref(),
                credit.character.clone().unwrap_or_default(),
            );
        }
    } else {
        for credit in credits
            .crew
            .iter()
            .filter(|c| c.department.eq_ignore_ascii_case(department))
        {
            add(
                credit.id,
                &credit.title,
                credit.release_date.as_deref(),
                credit.job.clone(),
            );
        }
    }

    films.sort_by_key(|f| f.release_date);
    films
}

/// Departments a person has credits in, cast first.
pub fn departments(credits: &MovieCredits) -> Vec<String> {
    let mut departments = Vec::new();
    if !credits.cast.is_empty() {
        departments.push(ACTING.to_string());
    }
    for credit in &credits.crew {
        if !credit.department.is_empty() && !departments.contains(&credit.department) {
            departments.push(credit.department.clone());
        }
    }
    departments
}
