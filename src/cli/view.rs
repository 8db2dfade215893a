use crate::{
    Res,
    config::Config,
    management::{ExportKind, ExportManager},
    query::SortOrder,
    render::Renderer,
    types::{ActivityRecord, DiaryTableRow, RatingTableRow, WatchlistTableRow},
    warning,
};

use super::ViewOptions;

/// Prints the watchlist, diary, ratings or watched table.
pub async fn view(
    config: &Config,
    exports: &ExportManager,
    renderer: &Renderer,
    kind: ExportKind,
    opts: &ViewOptions,
) -> Res<()> {
    let records = exports.load(kind).await?;
    let total = records.len();

    let query = opts.query(
        kind.default_sort(),
        SortOrder::from_ascending(config.cli.ascending),
    );
    let records = query.apply(records);

    if records.is_empty() && opts.films.is_some() {
        warning!("None of the searched person's films are in your {}", kind.title().to_lowercase());
    }

    let title = format!("{} ({} of {})", kind.title(), records.len(), total);
    match kind {
        ExportKind::Diary => renderer.table(&title, rows::<DiaryTableRow>(&records)),
        ExportKind::Ratings => renderer.table(&title, rows::<RatingTableRow>(&records)),
        _ => renderer.table(&title, rows::<WatchlistTableRow>(&records)),
    }
    Ok(())
}

fn rows<'a, T: From<&'a ActivityRecord>>(records: &'a [ActivityRecord]) -> Vec<T> {
    records.iter().map(T::from).collect()
}
