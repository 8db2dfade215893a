use crate::{
    Res,
    config::Config,
    letterboxd::LetterboxdSession,
    management::{ActivityIndex, ExportKind, ExportManager, find_list},
    query::{SortOrder, rating_averages},
    render::Renderer,
    tmdb::TmdbClient,
    types::{LetterboxdList, ListEntry, ListEntryTableRow, ListSummaryTableRow},
    utils, warning,
};

use super::ViewOptions;

/// Shows one list with rating means, or an overview of all lists.
pub async fn lists(
    config: &Config,
    exports: &ExportManager,
    renderer: &Renderer,
    tmdb: &TmdbClient,
    session: &LetterboxdSession,
    name: Option<&str>,
    opts: &ViewOptions,
) -> Res<()> {
    let all = exports.load_lists().await?;

    let Some(name) = name else {
        print_overview(renderer, &all);
        return Ok(());
    };

    let Some(list) = find_list(&all, name) else {
        warning!("No list matches '{}'", name);
        print_overview(renderer, &all);
        return Ok(());
    };

    let entries = list_entries(config, exports, tmdb, session, list).await?;

    let averages = rating_averages(
        &entries
            .iter()
            .map(|e| (e.record.rating, e.runtime))
            .collect::<Vec<_>>(),
    );

    let total = entries.len();
    // Position order unless asked otherwise.
    let shown = opts
        .query(ExportKind::Lists.default_sort(), SortOrder::Ascending)
        .apply(entries);

    renderer.table(
        &format!("{} ({} of {})", list.meta.name, shown.len(), total),
        shown
            .iter()
            .map(ListEntryTableRow::from)
            .collect::<Vec<_>>(),
    );

    let mut summary = vec![(
        "Rating Mean".to_string(),
        averages
            .mean
            .map(|m| format!("{:.2}", m))
            .unwrap_or_else(|| "-".to_string()),
    )];
    if config.tmdb.get_list_runtimes {
        summary.push((
            "Time-weighted Rating Mean".to_string(),
            averages
                .time_weighted_mean
                .map(|m| format!("{:.2}", m))
                .unwrap_or_else(|| "-".to_string()),
        ));
    }
    println!();
    renderer.dict(&summary);
    Ok(())
}

fn print_overview(renderer: &Renderer, lists: &[LetterboxdList]) {
    let rows = lists
        .iter()
        .map(|l| ListSummaryTableRow {
            name: l.meta.name.clone(),
            films: l.entries.len(),
            date: utils::fmt_date(l.meta.date),
            file: l
                .path
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_default(),
        })
        .collect::<Vec<_>>();
    renderer.table("Lists", rows);
}

/// Entries of one list joined with your ratings.
///
/// Ratings are matched on the Letterboxd URL and then on title and year;
/// unrated entries stay in the list with no rating. When
/// `TMDB.get_list_runtimes` is set, each entry's runtime is looked up through
/// the TMDB link on its Letterboxd page.
///
/// # Returns
///
/// The entries in file order, ready for [`crate::query::rating_averages`]
/// and the list table.
pub async fn list_entries(
    config: &Config,
    exports: &ExportManager,
    tmdb: &TmdbClient,
    session: &LetterboxdSession,
    list: &LetterboxdList,
) -> Res<Vec<ListEntry>> {
    let ratings = exports
        .load_optional(ExportKind::Ratings)
        .await?
        .unwrap_or_default();
    let index = ActivityIndex::from_records(&[], &[], &ratings);

    let mut entries: Vec<ListEntry> = list
        .entries
        .iter()
        .map(|record| {
            let mut record = record.clone();
            record.rating = index.rating_for(&record);
            ListEntry {
                record,
                runtime: None,
            }
        })
        .collect();

    if config.tmdb.get_list_runtimes {
        fetch_runtimes(tmdb, session, &mut entries).await?;
    }
    Ok(entries)
}

/// Looks up each entry's runtime through its Letterboxd page's TMDB link.
async fn fetch_runtimes(
    tmdb: &TmdbClient,
    session: &LetterboxdSession,
    entries: &mut [ListEntry],
) -> Res<()> {
    let pb = utils::spinner("Fetching runtimes...");
    let total = entries.len();
    let mut result = Ok(());

    for (i, entry) in entries.iter_mut().enumerate() {
        pb.set_message(format!("Fetching runtimes... {}/{}", i + 1, total));
        if let Err(e) = fill_runtime(tmdb, session, entry).await {
            result = Err(e);
            break;
        }
    }

    pb.finish_and_clear();
    result
}

async fn fill_runtime(
    tmdb: &TmdbClient,
    session: &LetterboxdSession,
    entry: &mut ListEntry,
) -> Res<()> {
    if entry.record.url.is_empty() {
        return Ok(());
    }
    match session.film_tmdb_id(&entry.record.url).await? {
        Some(id) => entry.runtime = tmdb.movie_runtime(id).await?,
        None => tracing::debug!(url = %entry.record.url, "no TMDB movie link"),
    }
    Ok(())
}
