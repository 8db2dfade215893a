use std::path::Path;

use csv::StringRecord;

use crate::{
    Error, Res,
    types::{ActivityRecord, LetterboxdList, ListMeta},
};

/// Parses one exported list file.
///
/// A list export starts with a version line, then a `Date,Name,...` header
/// and one row describing the list, then a `Position,Name,Year,URL,...`
/// header followed by the entries. Blank lines between the blocks are
/// skipped by the reader.
pub fn parse_list(content: &str, path: &Path) -> Res<LetterboxdList> {
    let invalid = |reason: &str| Error::InvalidExport {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let rows = reader
        .records()
        .collect::<Result<Vec<StringRecord>, csv::Error>>()?;

    let meta_header = rows
        .iter()
        .position(|r| r.get(0) == Some("Date") && r.iter().any(|f| f == "Name"))
        .ok_or_else(|| invalid("missing list header"))?;
    let meta_row = rows
        .get(meta_header + 1)
        .ok_or_else(|| invalid("missing list description row"))?;
    let meta: ListMeta = meta_row
        .deserialize(Some(&rows[meta_header]))
        .map_err(|e| invalid(&e.to_string()))?;

    let entries_header = rows
        .iter()
        .skip(meta_header + 2)
        .position(|r| r.iter().any(|f| f == "Name") && r.iter().any(|f| f == "Year"))
        .map(|offset| offset + meta_header + 2);

    let mut entries = Vec::new();
    if let Some(header_idx) = entries_header {
        let header = &rows[header_idx];
        for row in &rows[header_idx + 1..] {
            let entry: ActivityRecord = row.deserialize(Some(header))?;
            entries.push(entry);
        }
    }

    tracing::debug!(
        path = %path.display(),
        name = %meta.name,
        entries = entries.len(),
        "parsed list"
    );

    Ok(LetterboxdList {
        meta,
        path: path.to_path_buf(),
        entries,
    })
}

/// Finds a list by name: exact (case-insensitive) match first, then substring.
pub fn find_list<'a>(lists: &'a [LetterboxdList], name: &str) -> Option<&'a LetterboxdList> {
    let needle = name.trim().to_lowercase();
    lists
        .iter()
        .find(|l| l.meta.name.to_lowercase() == needle)
        .or_else(|| {
            lists
                .iter()
                .find(|l| l.meta.name.to_lowercase().contains(&needle))
        })
}
