//! Record-to-row mappings for the tab-separated dumps
//!
//! Each function is pure: one [`TypedRecord`] in, the ordered rows it implies
//! out. The primary row always comes first.

use crate::decoder::TypedRecord;
use crate::error::Result;
use crate::sink::{Row, Table};
use crate::value::decode_key;

/// Number of primary-profession slots on a person row
pub const PROFESSION_SLOTS: usize = 3;

const PROFESSION_COLUMNS: [&str; PROFESSION_SLOTS] =
    ["PrimaryProfession1", "PrimaryProfession2", "PrimaryProfession3"];

fn list<'a>(record: &'a TypedRecord, column: &str) -> &'a [String] {
    record.list(column).unwrap_or_default()
}

/// Decode every composite key in a list column
fn keys(record: &TypedRecord, column: &str) -> Result<Vec<i64>> {
    list(record, column)
        .iter()
        .map(|token| decode_key(token).map_err(|e| e.in_column(column)))
        .collect()
}

/// `title.basics`: one Title row, then one TitleGenre row per genre
pub fn title_rows(record: &TypedRecord) -> Result<Vec<Row>> {
    let title_id = record.get("tconst");
    let genres = list(record, "genres");

    let mut rows = Vec::with_capacity(1 + genres.len());
    rows.push(
        Row::new(Table::Title)
            .with("TitleID", title_id)
            .with("RunTime", record.get("runtimeMinutes"))
            .with("OriginalTitle", record.get("primaryTitle"))
            .with("StartYear", record.get("startYear"))
            .with("EndYear", record.get("endYear"))
            .with("MediaType", record.get("titleType")),
    );
    rows.extend(genres.iter().map(|genre| {
        Row::new(Table::TitleGenre)
            .with("TitleID", title_id)
            .with("Genre", genre.as_str())
    }));
    Ok(rows)
}

/// `name.basics`: one Person row with up to three profession slots, then
/// one KnownFor row per listed title
pub fn person_rows(record: &TypedRecord) -> Result<Vec<Row>> {
    let person_id = record.get("nconst");
    let professions = list(record, "primaryProfession");

    let mut person = Row::new(Table::Person)
        .with("PersonID", person_id)
        .with("PrimaryName", record.get("primaryName"))
        .with("BirthYear", record.get("birthYear"))
        .with("DeathYear", record.get("deathYear"));
    for (slot, column) in PROFESSION_COLUMNS.into_iter().enumerate() {
        person = person.with(column, professions.get(slot).map(String::as_str));
    }

    let known_for = keys(record, "knownForTitles")?;
    let mut rows = Vec::with_capacity(1 + known_for.len());
    rows.push(person);
    rows.extend(known_for.into_iter().map(|title_id| {
        Row::new(Table::KnownFor)
            .with("TitleID", title_id)
            .with("PersonID", person_id)
    }));
    Ok(rows)
}

/// `title.crew`: Wrote rows for writers, then Directed rows for directors
pub fn crew_rows(record: &TypedRecord) -> Result<Vec<Row>> {
    let title_id = record.get("tconst");
    let link = |table: Table, person_id: i64| {
        Row::new(table)
            .with("TitleID", title_id)
            .with("PersonID", person_id)
    };

    let mut rows: Vec<Row> = keys(record, "writers")?
        .into_iter()
        .map(|id| link(Table::Wrote, id))
        .collect();
    rows.extend(
        keys(record, "directors")?
            .into_iter()
            .map(|id| link(Table::Directed, id)),
    );
    Ok(rows)
}

/// `title.episode`
pub fn episode_rows(record: &TypedRecord) -> Result<Vec<Row>> {
    Ok(vec![Row::new(Table::EpisodeOf)
        .with("TitleID", record.get("tconst"))
        .with("ParentTitleID", record.get("parentTconst"))
        .with("SeasonNumber", record.get("seasonNumber"))
        .with("EpisodeNumber", record.get("episodeNumber"))])
}

/// `title.akas`
pub fn region_info_rows(record: &TypedRecord) -> Result<Vec<Row>> {
    Ok(vec![Row::new(Table::RegionInfo)
        .with("TitleID", record.get("titleId"))
        .with("Ordering", record.get("ordering"))
        .with("Region", record.get("region"))
        .with("Title", record.get("title"))
        .with("Language", record.get("language"))
        .with("IsOriginalTitle", record.get("isOriginalTitle"))])
}

/// `title.principals`
pub fn principal_rows(record: &TypedRecord) -> Result<Vec<Row>> {
    Ok(vec![Row::new(Table::PrincipalIn)
        .with("TitleID", record.get("tconst"))
        .with("PersonID", record.get("nconst"))
        .with("Ordering", record.get("ordering"))
        .with("Category", record.get("category"))
        .with("Job", record.get("job"))
        .with("Characters", record.get("characters"))])
}

/// `title.ratings`
pub fn rating_rows(record: &TypedRecord) -> Result<Vec<Row>> {
    Ok(vec![Row::new(Table::Rating)
        .with("TitleID", record.get("tconst"))
        .with("AverageRating", record.get("averageRating"))
        .with("VoteCount", record.get("numVotes"))])
}
