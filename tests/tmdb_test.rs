use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, Query},
    http::StatusCode,
    routing::get,
};
use serde_json::{Value, json};

use letterboxd_stats::Error;
use letterboxd_stats::cli::film_details;
use letterboxd_stats::tmdb::*;
use letterboxd_stats::types::MovieCredits;

const API_KEY: &str = "test-key";

type Reply = (StatusCode, Json<Value>);

fn not_found() -> Reply {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "status_code": 34,
            "status_message": "The resource you requested could not be found."
        })),
    )
}

fn check_key(params: &HashMap<String, String>) -> Option<Reply> {
    if params.get("api_key").map(String::as_str) == Some(API_KEY) {
        return None;
    }
    Some((
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "status_code": 7,
            "status_message": "Invalid API key: You must be granted a valid key."
        })),
    ))
}

async fn search_movie(Query(params): Query<HashMap<String, String>>) -> Reply {
    if let Some(reply) = check_key(&params) {
        return reply;
    }
    let results = match params.get("query").map(String::as_str) {
        Some("The Matrix") => json!([
            {"id": 603, "title": "The Matrix", "original_title": "The Matrix", "release_date": "1999-03-31", "popularity": 80.1},
            {"id": 624860, "title": "The Matrix Resurrections", "release_date": "2021-12-16", "popularity": 40.2}
        ]),
        _ => json!([]),
    };
    let total = results.as_array().map(Vec::len).unwrap_or(0);
    (
        StatusCode::OK,
        Json(json!({"page": 1, "results": results, "total_pages": 1, "total_results": total})),
    )
}

async fn search_person(Query(params): Query<HashMap<String, String>>) -> Reply {
    if let Some(reply) = check_key(&params) {
        return reply;
    }
    let results = match params.get("query").map(String::as_str) {
        Some("Akira Kurosawa") => json!([
            {"id": 5026, "name": "Akira Kurosawa", "known_for_department": "Directing", "popularity": 10.5}
        ]),
        _ => json!([]),
    };
    (StatusCode::OK, Json(json!({"page": 1, "results": results, "total_results": 1})))
}

async fn movie(Path(id): Path<u64>, Query(params): Query<HashMap<String, String>>) -> Reply {
    if let Some(reply) = check_key(&params) {
        return reply;
    }
    if id != 603 {
        return not_found();
    }
    (
        StatusCode::OK,
        Json(json!({
            "id": 603,
            "title": "The Matrix",
            "original_title": "The Matrix",
            "runtime": 136,
            "overview": "Set in the 22nd century...",
            "release_date": "1999-03-31",
            "poster_path": "/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg",
            "genres": [{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}],
            "credits": {
                "cast": [
                    {"name": "Keanu Reeves", "character": "Neo", "order": 0},
                    {"name": "Laurence Fishburne", "character": "Morpheus", "order": 1}
                ],
                "crew": [
                    {"name": "Lana Wachowski", "job": "Director", "department": "Directing"},
                    {"name": "Lilly Wachowski", "job": "Director", "department": "Directing"},
                    {"name": "Bill Pope", "job": "Director of Photography", "department": "Camera"}
                ]
            }
        })),
    )
}

async fn person_credits(
    Path(id): Path<u64>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    if let Some(reply) = check_key(&params) {
        return reply;
    }
    if id != 5026 {
        return not_found();
    }
    (
        StatusCode::OK,
        Json(json!({
            "cast": [
                {"id": 1, "title": "Sugata Sanshiro", "release_date": "1943-03-25", "character": "Extra"}
            ],
            "crew": [
                {"id": 11645, "title": "Ran", "release_date": "1985-06-01", "department": "Directing", "job": "Director"},
                {"id": 11645, "title": "Ran", "release_date": "1985-06-01", "department": "Writing", "job": "Screenplay"},
                {"id": 346, "title": "Seven Samurai", "release_date": "1954-04-26", "department": "Directing", "job": "Director"},
                {"id": 346, "title": "Seven Samurai", "release_date": "1954-04-26", "department": "Writing", "job": "Screenplay"},
                {"id": 346, "title": "Seven Samurai", "release_date": "1954-04-26", "department": "Editing", "job": "Editor"}
            ]
        })),
    )
}

async fn spawn_mock_tmdb() -> String {
    let app = Router::new()
        .route("/search/movie", get(search_movie))
        .route("/search/person", get(search_person))
        .route("/movie/{id}", get(movie))
        .route("/person/{id}/movie_credits", get(person_credits));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_search_movies() {
    let url = spawn_mock_tmdb().await;
    let client = TmdbClient::with_base_url(API_KEY, &url);

    let movies = client.search_movies("The Matrix").await.unwrap();
    assert_eq!(movies.len(), 2);
    assert_eq!(movies[0].id, 603);
    assert_eq!(movies[1].original_title, None);
}

#[tokio::test]
async fn test_search_without_match_is_empty() {
    let url = spawn_mock_tmdb().await;
    let client = TmdbClient::with_base_url(API_KEY, &url);

    assert!(client.search_movies("zzzz").await.unwrap().is_empty());
    assert!(client.search_people("nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_movie_details() {
    let url = spawn_mock_tmdb().await;
    let client = TmdbClient::with_base_url(API_KEY, &url);

    let details = client.movie_details(603).await.unwrap();
    assert_eq!(details.runtime, Some(136));
    assert_eq!(details.genres.len(), 2);
    assert_eq!(details.credits.map(|c| c.cast.len()), Some(2));
}

#[tokio::test]
async fn test_unknown_movie_is_an_api_error() {
    let url = spawn_mock_tmdb().await;
    let client = TmdbClient::with_base_url(API_KEY, &url);

    match client.movie_details(1).await {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 404);
            assert!(message.contains("could not be found"));
        }
        other => panic!("expected Api error, got {:?}", other.map(|d| d.id)),
    }
}

#[tokio::test]
async fn test_runtime_of_unknown_movie_is_none() {
    let url = spawn_mock_tmdb().await;
    let client = TmdbClient::with_base_url(API_KEY, &url);

    assert_eq!(client.movie_runtime(603).await.unwrap(), Some(136));
    assert_eq!(client.movie_runtime(1).await.unwrap(), None);
}

#[tokio::test]
async fn test_invalid_api_key() {
    let url = spawn_mock_tmdb().await;
    let client = TmdbClient::with_base_url("wrong", &url);

    assert!(matches!(
        client.search_movies("The Matrix").await,
        Err(Error::Api { status: 401, .. })
    ));
}

#[tokio::test]
async fn test_unreachable_host_is_a_network_error() {
    // Nothing listens on port 9 locally
    let client = TmdbClient::with_base_url(API_KEY, "http://127.0.0.1:9");
    assert!(matches!(
        client.search_movies("The Matrix").await,
        Err(Error::Network(_))
    ));
}

#[tokio::test]
async fn test_person_filmography() {
    let url = spawn_mock_tmdb().await;
    let client = TmdbClient::with_base_url(API_KEY, &url);

    let people = client.search_people("Akira Kurosawa").await.unwrap();
    let credits = client.person_movie_credits(people[0].id).await.unwrap();

    let directing = filmography(&credits, "Directing");
    assert_eq!(directing.len(), 2);
    assert_eq!(directing[0].title, "Seven Samurai");
    assert_eq!(directing[1].title, "Ran");

    let writing = filmography(&credits, "writing");
    assert_eq!(writing.len(), 2);
    assert_eq!(writing[0].jobs, vec!["Screenplay".to_string()]);

    let acting = filmography(&credits, ACTING);
    assert_eq!(acting.len(), 1);
    assert_eq!(acting[0].jobs, vec!["Extra".to_string()]);

    assert_eq!(
        departments(&credits),
        vec!["Acting", "Directing", "Writing", "Editing"]
    );
}

#[test]
fn test_filmography_merges_jobs() {
    let credits: MovieCredits = serde_json::from_value(json!({
        "cast": [],
        "crew": [
            {"id": 1, "title": "Mirror", "release_date": "1975-03-07", "department": "Writing", "job": "Screenplay"},
            {"id": 1, "title": "Mirror", "release_date": "1975-03-07", "department": "Writing", "job": "Writer"},
            {"id": 2, "title": "Untitled", "release_date": "", "department": "Writing", "job": "Writer"}
        ]
    }))
    .unwrap();

    let films = filmography(&credits, "Writing");
    assert_eq!(films.len(), 2);
    // Unknown release dates sort first
    assert_eq!(films[0].title, "Untitled");
    assert_eq!(films[1].jobs, vec!["Screenplay", "Writer"]);
}

#[tokio::test]
async fn test_film_details_rows() {
    let url = spawn_mock_tmdb().await;
    let client = TmdbClient::with_base_url(API_KEY, &url);
    let details = client.movie_details(603).await.unwrap();

    let rows = film_details(&details);
    let get = |key: &str| {
        rows.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };

    assert_eq!(get("Original Title"), None);
    assert_eq!(get("Runtime").as_deref(), Some("136 min"));
    assert_eq!(get("Genres").as_deref(), Some("Action, Science Fiction"));
    assert_eq!(
        get("Director").as_deref(),
        Some("Lana Wachowski, Lilly Wachowski")
    );
    assert_eq!(get("Cast").as_deref(), Some("Keanu Reeves, Laurence Fishburne"));
    assert_eq!(
        get("Letterboxd URL").as_deref(),
        Some("https://letterboxd.com/tmdb/603/")
    );
}

#[test]
fn test_poster_url() {
    assert_eq!(
        poster_url("/abc.jpg"),
        "https://www.themoviedb.org/t/p/w600_and_h900_bestv2/abc.jpg"
    );
}
