use std::{
    collections::HashMap,
    fs,
    io::{Cursor, Write},
};

use axum::{
    Form, Router,
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use letterboxd_stats::Error;
use letterboxd_stats::letterboxd::*;
use letterboxd_stats::management::ExportManager;
use letterboxd_stats::types::FilmUserStatus;

const CSRF: &str = "9f1c2b7e";
const SESSION_COOKIE: &str = "letterboxd.user.CURRENT";

const DIARY_CSV: &str = "\
Date,Name,Year,Letterboxd URI,Rating,Rewatch,Tags,Watched Date
2024-01-02,Heat,1995,https://boxd.it/aaaa,4.5,,,2024-01-01
";

const RATINGS_CSV: &str = "\
Date,Name,Year,Letterboxd URI,Rating
2024-01-02,Heat,1995,https://boxd.it/aaaa,4.5
";

// Helper function to build an export archive like the one Letterboxd serves
fn create_test_archive() -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut writer = ZipWriter::new(&mut buf);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        let files = [
            ("diary.csv", DIARY_CSV),
            ("watchlist.csv", "Date,Name,Year,Letterboxd URI\n"),
            ("ratings.csv", RATINGS_CSV),
            ("watched.csv", "Date,Name,Year,Letterboxd URI\n"),
        ];
        for (name, content) in files {
            writer.start_file(name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.add_directory("lists/", options).unwrap();
        writer.start_file("lists/heists.csv", options).unwrap();
        writer
            .write_all(b"Letterboxd list export v7\nDate,Name,Tags,URL,Description\n2024-05-01,Heists,,,\n")
            .unwrap();
        writer.finish().unwrap();
    }
    buf.into_inner()
}

// Same archive with one byte of the ratings payload flipped, so its CRC no
// longer matches while every header still parses.
fn create_corrupt_archive() -> Vec<u8> {
    let mut bytes = create_test_archive();
    let needle = b"Heat,1995,https://boxd.it/aaaa,4.5";
    let start = bytes
        .windows(needle.len())
        .enumerate()
        .filter(|(_, w)| *w == needle)
        .map(|(i, _)| i)
        .nth(1)
        .expect("ratings payload in archive");
    bytes[start] ^= 0x01;
    bytes
}

async fn home() -> Response {
    (
        [(
            header::SET_COOKIE,
            format!("com.xk72.webparts.csrf={}; Path=/", CSRF),
        )],
        Html("<html><body>Letterboxd</body></html>"),
    )
        .into_response()
}

async fn login(Form(form): Form<HashMap<String, String>>) -> Response {
    let field = |name: &str| form.get(name).map(String::as_str).unwrap_or_default();

    if field("__csrf") != CSRF {
        return (StatusCode::FORBIDDEN, "missing csrf").into_response();
    }
    if field("username") == "cinephile" && field("password") == "hunter2" {
        return (
            [(header::SET_COOKIE, format!("{}=abc; Path=/", SESSION_COOKIE))],
            axum::Json(serde_json::json!({"result": "success", "messages": []})),
        )
            .into_response();
    }
    axum::Json(serde_json::json!({
        "result": "error",
        "messages": ["<strong>Your credentials don’t match.</strong> Please try again."]
    }))
    .into_response()
}

fn logged_in(headers: &HeaderMap) -> bool {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains(SESSION_COOKIE))
}

async fn export_zip(headers: HeaderMap) -> Response {
    if !logged_in(&headers) {
        return (StatusCode::FORBIDDEN, Html("sign in")).into_response();
    }
    (
        [
            (header::CONTENT_TYPE, "application/zip"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"letterboxd-cinephile-2024-06-01-10-00-utc.zip\"",
            ),
        ],
        create_test_archive(),
    )
        .into_response()
}

async fn export_corrupt(headers: HeaderMap) -> Response {
    if !logged_in(&headers) {
        return (StatusCode::FORBIDDEN, Html("sign in")).into_response();
    }
    (
        [(header::CONTENT_TYPE, "application/zip")],
        create_corrupt_archive(),
    )
        .into_response()
}

async fn export_html(headers: HeaderMap) -> Response {
    if !logged_in(&headers) {
        return (StatusCode::FORBIDDEN, Html("sign in")).into_response();
    }
    Html("<html>Maintenance</html>").into_response()
}

async fn film_ran() -> Html<&'static str> {
    Html(
        r#"<html><body><p class="text-link">More at
        <a href="https://www.imdb.com/title/tt0089881/" data-track-action="IMDb">IMDb</a>
        <a href="https://www.themoviedb.org/movie/11645/" data-track-action="TMDb">TMDb</a>
        </p></body></html>"#,
    )
}

async fn film_tv() -> Html<&'static str> {
    Html(
        r#"<html><body>
        <a href="https://www.themoviedb.org/tv/1396/" data-track-action="TMDb">TMDb</a>
        </body></html>"#,
    )
}

async fn tmdb_matrix() -> Redirect {
    Redirect::to("/film/the-matrix/")
}

async fn film_matrix() -> Html<&'static str> {
    Html("<html><body><h1>The Matrix</h1></body></html>")
}

async fn sidebar_matrix(headers: HeaderMap) -> Response {
    if !logged_in(&headers) {
        return Html("<html><body></body></html>").into_response();
    }
    Html(
        r#"<html><body>
        <form id="frm-sidebar-rating" data-rateable-uid="film:51518" action="/s/film:51518/rate/"></form>
        </body></html>"#,
    )
    .into_response()
}

async fn film_metadata(headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> Response {
    if !logged_in(&headers) || form.get("likeables").map(String::as_str) != Some("film:51518") {
        return axum::Json(serde_json::json!({"result": false})).into_response();
    }
    axum::Json(serde_json::json!({
        "result": true,
        "watchables": [{"uid": "film:51518", "watched": true}],
        "likeables": [{"uid": "film:51518", "liked": true}],
        "rateables": [{"uid": "film:51518", "rating": 9}],
        "filmsInWatchlist": []
    }))
    .into_response()
}

#[derive(Clone, Copy)]
enum ExportReply {
    Zip,
    Corrupt,
    Html,
}

async fn spawn_mock_letterboxd(reply: ExportReply) -> String {
    let export = match reply {
        ExportReply::Zip => get(export_zip),
        ExportReply::Corrupt => get(export_corrupt),
        ExportReply::Html => get(export_html),
    };
    let app = Router::new()
        .route("/", get(home))
        .route("/user/login.do", post(login))
        .route("/data/export", export)
        .route("/film/ran/", get(film_ran))
        .route("/film/breaking-bad/", get(film_tv))
        .route("/tmdb/603/", get(tmdb_matrix))
        .route("/film/the-matrix/", get(film_matrix))
        .route(
            "/csi/film/the-matrix/sidebar-user-actions/",
            get(sidebar_matrix),
        )
        .route("/ajax/letterboxd-metadata/", post(film_metadata));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_login_and_download_export() {
    let url = spawn_mock_letterboxd(ExportReply::Zip).await;
    let dest = tempfile::tempdir().unwrap();

    let mut session = LetterboxdSession::with_base_url(&url).unwrap();
    session.login("cinephile", "hunter2").await.unwrap();
    assert!(session.logged_in());

    let filename = session.download_export(dest.path()).await.unwrap();
    assert_eq!(filename, "letterboxd-cinephile-2024-06-01-10-00-utc.zip");

    assert_eq!(
        fs::read_to_string(dest.path().join("diary.csv")).unwrap(),
        DIARY_CSV
    );
    assert!(dest.path().join("lists").join("heists.csv").is_file());
    assert!(ExportManager::new(dest.path()).exists());
}

#[tokio::test]
async fn test_failed_login_leaves_existing_export_untouched() {
    let url = spawn_mock_letterboxd(ExportReply::Zip).await;
    let dest = tempfile::tempdir().unwrap();
    let diary = dest.path().join("diary.csv");
    fs::write(&diary, "previous export").unwrap();

    let mut session = LetterboxdSession::with_base_url(&url).unwrap();
    match session.login("cinephile", "wrong").await {
        Err(Error::Auth(reason)) => assert!(reason.contains("credentials don’t match")),
        other => panic!("expected Auth error, got {:?}", other),
    }
    assert!(!session.logged_in());

    assert!(matches!(
        session.download_export(dest.path()).await,
        Err(Error::Auth(_))
    ));
    assert_eq!(fs::read_to_string(&diary).unwrap(), "previous export");
}

#[tokio::test]
async fn test_non_zip_export_is_rejected() {
    let url = spawn_mock_letterboxd(ExportReply::Html).await;
    let dest = tempfile::tempdir().unwrap();
    let diary = dest.path().join("diary.csv");
    fs::write(&diary, "previous export").unwrap();

    let mut session = LetterboxdSession::with_base_url(&url).unwrap();
    session.login("cinephile", "hunter2").await.unwrap();

    assert!(matches!(
        session.download_export(dest.path()).await,
        Err(Error::UnexpectedResponse { .. })
    ));
    assert_eq!(fs::read_to_string(&diary).unwrap(), "previous export");
}

#[tokio::test]
async fn test_corrupt_archive_leaves_existing_export_untouched() {
    let url = spawn_mock_letterboxd(ExportReply::Corrupt).await;
    let dest = tempfile::tempdir().unwrap();
    let diary = dest.path().join("diary.csv");
    let ratings = dest.path().join("ratings.csv");
    fs::write(&diary, "OLD DIARY\n").unwrap();
    fs::write(&ratings, "OLD RATINGS\n").unwrap();

    let mut session = LetterboxdSession::with_base_url(&url).unwrap();
    session.login("cinephile", "hunter2").await.unwrap();

    match session.download_export(dest.path()).await {
        Err(Error::InvalidExport { reason, .. }) => assert!(reason.contains("ratings.csv")),
        other => panic!("expected InvalidExport, got {:?}", other),
    }
    assert_eq!(fs::read_to_string(&diary).unwrap(), "OLD DIARY\n");
    assert_eq!(fs::read_to_string(&ratings).unwrap(), "OLD RATINGS\n");
    assert!(!dest.path().join("lists").exists());
}

#[tokio::test]
async fn test_rejected_login_form_is_an_auth_error() {
    // The site hands out a token the login handler does not accept.
    async fn stale_home() -> Response {
        (
            [(header::SET_COOKIE, "com.xk72.webparts.csrf=stale; Path=/")],
            Html("<html></html>"),
        )
            .into_response()
    }
    let app = Router::new()
        .route("/", get(stale_home))
        .route("/user/login.do", post(login));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let mut session = LetterboxdSession::with_base_url(&format!("http://{}", addr)).unwrap();
    match session.login("cinephile", "hunter2").await {
        Err(Error::Auth(reason)) => assert!(reason.contains("403")),
        other => panic!("expected Auth error, got {:?}", other),
    }
    assert!(!session.logged_in());
}

#[tokio::test]
async fn test_film_user_status() {
    let url = spawn_mock_letterboxd(ExportReply::Zip).await;
    let mut session = LetterboxdSession::with_base_url(&url).unwrap();

    assert!(matches!(
        session.film_user_status(603).await,
        Err(Error::Auth(_))
    ));

    session.login("cinephile", "hunter2").await.unwrap();
    assert_eq!(
        session.film_user_status(603).await.unwrap(),
        Some(FilmUserStatus {
            watched: true,
            liked: true,
            watchlisted: false,
            rating: Some(4.5),
        })
    );

    // No film page behind this TMDB id
    assert_eq!(session.film_user_status(1).await.unwrap(), None);
}

#[test]
fn test_parse_film_uid() {
    let html = r#"<div><form id="frm-sidebar-rating" data-rateable-uid="film:51518"></form></div>"#;
    assert_eq!(parse_film_uid(html).unwrap(), Some("51518".to_string()));
    assert_eq!(parse_film_uid("<div></div>").unwrap(), None);
}

#[tokio::test]
async fn test_unreachable_site_is_a_network_error() {
    let mut session = LetterboxdSession::with_base_url("http://127.0.0.1:9").unwrap();
    assert!(matches!(
        session.login("cinephile", "hunter2").await,
        Err(Error::Network(_))
    ));
}

#[tokio::test]
async fn test_film_tmdb_id() {
    let url = spawn_mock_letterboxd(ExportReply::Zip).await;
    let session = LetterboxdSession::with_base_url(&url).unwrap();

    assert_eq!(session.film_tmdb_id("/film/ran/").await.unwrap(), Some(11645));
    assert_eq!(
        session
            .film_tmdb_id(&format!("{}/film/breaking-bad/", url))
            .await
            .unwrap(),
        None
    );
}

#[test]
fn test_parse_tmdb_id_without_link() {
    assert_eq!(parse_tmdb_id("<html><body></body></html>").unwrap(), None);
}

#[test]
fn test_letterboxd_url_for_tmdb() {
    assert_eq!(
        letterboxd_url_for_tmdb(603),
        "https://letterboxd.com/tmdb/603/"
    );
}
