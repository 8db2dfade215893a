use chrono::Datelike;

use crate::{
    Error, Res,
    config::Config,
    info,
    letterboxd::{LetterboxdSession, letterboxd_url_for_tmdb},
    management::{ActivityIndex, ExportManager},
    query::{FilmSet, SortKey, SortOrder},
    render::Renderer,
    tmdb::{ACTING, TmdbClient, departments, filmography, poster_url},
    types::{
        FilmCandidateTableRow, FilmCredit, FilmUserStatus, FilmographyTableRow, MovieDetails,
        PersonCandidateTableRow,
    },
    utils, warning,
};

use super::ViewOptions;

/// Number of cast members shown in film details.
const TOP_CAST: usize = 5;

fn pick_index(pick: usize, candidates: usize) -> Res<usize> {
    if pick == 0 || pick > candidates {
        return Err(Error::Other(format!(
            "--pick {} is out of range: the search returned {} candidate(s)",
            pick, candidates
        )));
    }
    Ok(pick - 1)
}

/// Searches a person and prints the filmography of one department.
///
/// Returns the set of films in that filmography so the export views can be
/// narrowed to them. `None` when the search found nobody.
#[allow(clippy::too_many_arguments)]
pub async fn search_person(
    config: &Config,
    tmdb: &TmdbClient,
    exports: &ExportManager,
    renderer: &Renderer,
    name: &str,
    department: Option<&str>,
    pick: usize,
    opts: &ViewOptions,
) -> Res<Option<FilmSet>> {
    info!("Searching TMDB for '{}'", name);
    let people = tmdb.search_people(name).await?;

    let candidates = people
        .iter()
        .enumerate()
        .map(|(i, p)| PersonCandidateTableRow {
            rank: i + 1,
            id: p.id,
            name: p.name.clone(),
            known_for: p.known_for_department.clone().unwrap_or_default(),
        })
        .collect::<Vec<_>>();
    renderer.table("People", candidates);

    if people.is_empty() {
        warning!("No person found for '{}'", name);
        return Ok(None);
    }

    let person = &people[pick_index(pick, people.len())?];
    let details = tmdb.person_details(person.id).await?;
    let credits = tmdb.person_movie_credits(person.id).await?;

    let department = department
        .map(str::to_string)
        .or(details.known_for_department.clone())
        .unwrap_or_else(|| ACTING.to_string());

    let available = departments(&credits);
    if !available
        .iter()
        .any(|d| d.eq_ignore_ascii_case(&department))
    {
        warning!(
            "{} has no credits in {}. Available departments: {}",
            details.name,
            department,
            available.join(", ")
        );
    }

    let mut films = filmography(&credits, &department);
    let film_set: FilmSet = films.iter().collect();

    if let Some(index) = ActivityIndex::load(exports).await? {
        for film in films.iter_mut() {
            let year = film.release_date.map(|d| d.year());
            film.watched = Some(index.is_watched(&film.title, year));
            film.rating = index.rating(&film.title, year);
        }
    } else {
        tracing::info!("no export found, skipping watched status");
    }

    if config.tmdb.get_list_runtimes {
        fetch_runtimes(tmdb, &mut films).await?;
    }

    let mut person_info = vec![("Name".to_string(), details.name.clone())];
    if let Some(birthday) = &details.birthday {
        person_info.push(("Born".to_string(), birthday.clone()));
    }
    if let Some(place) = &details.place_of_birth {
        person_info.push(("Place of Birth".to_string(), place.clone()));
    }
    person_info.push(("Department".to_string(), department.clone()));
    println!();
    renderer.dict(&person_info);

    let total = films.len();
    // Filmographies read oldest first unless asked otherwise.
    let films = opts
        .query(SortKey::Date, SortOrder::Ascending)
        .apply(films);
    renderer.table(
        &format!("Filmography: {} ({} of {})", department, films.len(), total),
        films
            .iter()
            .map(FilmographyTableRow::from)
            .collect::<Vec<_>>(),
    );

    Ok(Some(film_set))
}

async fn fetch_runtimes(tmdb: &TmdbClient, films: &mut [FilmCredit]) -> Res<()> {
    let pb = utils::spinner("Fetching runtimes...");
    let mut result = Ok(());
    for film in films.iter_mut() {
        match tmdb.movie_runtime(film.id).await {
            Ok(runtime) => film.runtime = runtime,
            Err(e) => {
                result = Err(e);
                break;
            }
        }
    }
    pb.finish_and_clear();
    result
}

/// Searches a film and prints its poster, details and your status for it.
///
/// With Letterboxd credentials configured, the status is read live from the
/// site and includes whether the film is liked. Otherwise, or when the site
/// cannot be reached, it comes from the local export.
///
/// # Arguments
///
/// * `session` - Letterboxd session, logged in on demand
/// * `title` - Search query sent to TMDB
/// * `pick` - 1-based index of the candidate to expand
/// * `show_poster` - Whether to print the ASCII poster
///
/// # Errors
///
/// Fails when TMDB cannot be reached or `pick` is out of range. An empty
/// search result only prints a warning.
#[allow(clippy::too_many_arguments)]
pub async fn search_film(
    config: &Config,
    tmdb: &TmdbClient,
    exports: &ExportManager,
    renderer: &Renderer,
    session: &mut LetterboxdSession,
    title: &str,
    pick: usize,
    show_poster: bool,
) -> Res<()> {
    info!("Searching TMDB for '{}'", title);
    let movies = tmdb.search_movies(title).await?;

    let candidates = movies
        .iter()
        .enumerate()
        .map(|(i, m)| FilmCandidateTableRow {
            rank: i + 1,
            id: m.id,
            title: m.title.clone(),
            release_date: m.release_date.clone().unwrap_or_default(),
        })
        .collect::<Vec<_>>();
    renderer.table("Films", candidates);

    if movies.is_empty() {
        warning!("No film found for '{}'", title);
        return Ok(());
    }

    let movie = &movies[pick_index(pick, movies.len())?];
    let details = tmdb.movie_details(movie.id).await?;

    if show_poster {
        if let Some(path) = &details.poster_path {
            // A broken poster should not hide the details.
            if let Err(e) = renderer.poster(&poster_url(path)).await {
                warning!("Cannot render poster: {}", e);
            }
        }
    }

    println!();
    renderer.dict(&film_details(&details));

    if config.credentials().is_ok() {
        match live_status(config, session, details.id).await {
            Ok(Some(status)) => {
                println!();
                renderer.dict(&film_status(&status));
                return Ok(());
            }
            Ok(None) => warning!("{} is not on Letterboxd", details.title),
            Err(e) => warning!("Cannot read your Letterboxd status: {}", e),
        }
    }

    if let Some(index) = ActivityIndex::load(exports).await? {
        let year = utils::parse_date(details.release_date.as_deref()).map(|d| d.year());
        let status = vec![
            (
                "Watched".to_string(),
                yes_no(index.is_watched(&details.title, year)),
            ),
            (
                "Your Rating".to_string(),
                fmt_your_rating(index.rating(&details.title, year)),
            ),
            (
                "In Watchlist".to_string(),
                yes_no(index.in_watchlist(&details.title, year)),
            ),
        ];
        println!();
        renderer.dict(&status);
    }

    Ok(())
}

async fn live_status(
    config: &Config,
    session: &mut LetterboxdSession,
    tmdb_id: u64,
) -> Res<Option<FilmUserStatus>> {
    if !session.logged_in() {
        let (username, password) = config.credentials()?;
        let pb = utils::spinner("Logging in...");
        let login = session.login(username, password).await;
        pb.finish_and_clear();
        login?;
    }
    session.film_user_status(tmdb_id).await
}

/// Key/value rows of your live Letterboxd status for a film.
pub fn film_status(status: &FilmUserStatus) -> Vec<(String, String)> {
    vec![
        ("Watched".to_string(), yes_no(status.watched)),
        ("Liked".to_string(), yes_no(status.liked)),
        ("Your Rating".to_string(), fmt_your_rating(status.rating)),
        ("In Watchlist".to_string(), yes_no(status.watchlisted)),
    ]
}

fn yes_no(b: bool) -> String {
    (if b { "Yes" } else { "No" }).to_string()
}

fn fmt_your_rating(rating: Option<f32>) -> String {
    rating
        .map(|r| utils::fmt_rating(Some(r)))
        .unwrap_or_else(|| "-".to_string())
}

/// Key/value rows describing a film.
pub fn film_details(details: &MovieDetails) -> Vec<(String, String)> {
    let mut rows = vec![("Title".to_string(), details.title.clone())];

    if let Some(original) = details
        .original_title
        .as_ref()
        .filter(|o| **o != details.title)
    {
        rows.push(("Original Title".to_string(), original.clone()));
    }

    rows.push((
        "Release Date".to_string(),
        details.release_date.clone().unwrap_or_default(),
    ));
    rows.push(("Runtime".to_string(), utils::fmt_runtime(details.runtime)));
    rows.push((
        "Genres".to_string(),
        details
            .genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    ));

    if let Some(credits) = &details.credits {
        let directors = credits
            .crew
            .iter()
            .filter(|c| c.job == "Director")
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>();
        rows.push(("Director".to_string(), directors.join(", ")));

        let mut cast = credits.cast.iter().collect::<Vec<_>>();
        cast.sort_by_key(|c| c.order);
        rows.push((
            "Cast".to_string(),
            cast.iter()
                .take(TOP_CAST)
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        ));
    }

    rows.push((
        "Overview".to_string(),
        details.overview.clone().unwrap_or_default(),
    ));
    rows.push((
        "Letterboxd URL".to_string(),
        letterboxd_url_for_tmdb(details.id),
    ));
    rows
}
