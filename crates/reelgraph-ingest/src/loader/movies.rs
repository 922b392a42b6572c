//! Loader for the quoted comma-separated movie dataset
//!
//! Columns are positional: rank, title, genre list, description, director,
//! actor list, year, runtime, rating, votes, revenue, metascore. Empty
//! numeric columns are null.
//!
//! A movie is matched to an existing title by its natural key (title, media
//! type `movie`, start year, runtime). Matches get their description and
//! rating extras filled in; everything else is inserted as a new title.

use std::io::BufRead;
use std::str::FromStr;

use indicatif::ProgressBar;
use tracing::{debug, info, trace};

use super::{LoadStats, Loader};
use crate::error::{IngestError, Result};
use crate::schema::ColumnType;
use crate::sink::{Filter, Row, RowSink, SqlValue, Table};
use crate::tokenize::split_quoted;

/// Default file name of the movie dataset in the data directory
pub const MOVIES_FILE_NAME: &str = "IMDB-Movie-Data.csv";

const MOVIE_COLUMNS: usize = 12;

const MEDIA_TYPE_MOVIE: &str = "movie";

/// One line of the movie dataset
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub rank: i64,
    pub title: String,
    pub genres: Vec<String>,
    pub description: String,
    pub director: String,
    pub actors: Vec<String>,
    pub year: Option<i64>,
    pub runtime: Option<i64>,
    pub rating: Option<f64>,
    pub votes: Option<i64>,
    pub revenue: Option<f64>,
    pub metascore: Option<f64>,
}

impl MovieRecord {
    /// Parse one data line
    pub fn parse(line: &str) -> Result<Self> {
        let columns = split_quoted(line.trim_end_matches(['\n', '\r']))?;
        if columns.len() != MOVIE_COLUMNS {
            return Err(IngestError::RowShapeMismatch {
                expected: MOVIE_COLUMNS,
                actual: columns.len(),
            });
        }

        let rank = columns[0]
            .parse()
            .map_err(|_| IngestError::type_mismatch(ColumnType::Integer, columns[0].as_str()))
            .map_err(|e| e.in_column("rank"))?;

        Ok(Self {
            rank,
            title: columns[1].clone(),
            genres: name_list(&columns[2]).map_err(|e| e.in_column("genre"))?,
            description: columns[3].clone(),
            director: columns[4].trim().to_string(),
            actors: name_list(&columns[5]).map_err(|e| e.in_column("actors"))?,
            year: optional_number(&columns[6], ColumnType::Integer, "year")?,
            runtime: optional_number(&columns[7], ColumnType::Integer, "runtime")?,
            rating: optional_number(&columns[8], ColumnType::Real, "rating")?,
            votes: optional_number(&columns[9], ColumnType::Integer, "votes")?,
            revenue: optional_number(&columns[10], ColumnType::Real, "revenue")?,
            metascore: optional_number(&columns[11], ColumnType::Real, "metascore")?,
        })
    }

    /// Filter selecting the existing title this movie describes
    pub fn natural_key(&self) -> Filter {
        Filter::new()
            .eq("OriginalTitle", self.title.as_str())
            .eq("MediaType", MEDIA_TYPE_MOVIE)
            .eq("StartYear", self.year.map(|year| year.to_string()))
            .eq("RunTime", self.runtime)
    }
}

/// A nested list column, trimmed and without empty entries
fn name_list(field: &str) -> Result<Vec<String>> {
    Ok(split_quoted(field)?
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}

fn optional_number<T: FromStr>(raw: &str, column_type: ColumnType, column: &str) -> Result<Option<T>> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| IngestError::type_mismatch(column_type, raw).in_column(column))
}

fn integer_field(row: &Row, column: &str) -> Result<i64> {
    match row.get(column) {
        Some(SqlValue::Integer(id)) => Ok(*id),
        other => Err(IngestError::type_mismatch(ColumnType::Integer, format!("{:?}", other))
            .in_column(column.to_string())),
    }
}

/// What happened to one movie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieOutcome {
    /// Matched an existing title, which was updated in place
    Updated { title_id: i64, writes: u64 },
    /// No match; a new title was inserted
    Inserted { title_id: i64, writes: u64 },
}

impl MovieOutcome {
    pub fn writes(self) -> u64 {
        match self {
            MovieOutcome::Updated { writes, .. } | MovieOutcome::Inserted { writes, .. } => writes,
        }
    }
}

/// Merges the movie dataset into titles loaded from the dumps
#[derive(Debug, Clone)]
pub struct MovieLoader {
    /// File name shown in logs and progress
    name: String,
}

impl Default for MovieLoader {
    fn default() -> Self {
        Self::new(MOVIES_FILE_NAME)
    }
}

impl MovieLoader {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Write one movie's rows, updating or inserting as its natural key dictates
    pub fn store(&self, movie: &MovieRecord, sink: &mut dyn RowSink) -> Result<MovieOutcome> {
        match sink.query_row(Table::Title, &movie.natural_key())? {
            Some(existing) => {
                let title_id = integer_field(&existing, "TitleID")?;
                let writes = self.update_existing(title_id, movie, sink)?;
                Ok(MovieOutcome::Updated { title_id, writes })
            }
            None => self.insert_new(movie, sink),
        }
    }

    fn update_existing(&self, title_id: i64, movie: &MovieRecord, sink: &mut dyn RowSink) -> Result<u64> {
        let by_title = Filter::new().eq("TitleID", title_id);
        sink.update_rows(
            Table::Title,
            &by_title,
            &[("Description", SqlValue::from(movie.description.as_str()))],
        )?;

        if sink.query_row(Table::Rating, &by_title)?.is_some() {
            sink.update_rows(
                Table::Rating,
                &by_title,
                &[
                    ("MetaScore", SqlValue::from(movie.metascore)),
                    ("Revenue", SqlValue::from(movie.revenue)),
                ],
            )?;
        } else {
            sink.insert_row(&rating_row(title_id, movie))?;
        }
        Ok(2)
    }

    fn insert_new(&self, movie: &MovieRecord, sink: &mut dyn RowSink) -> Result<MovieOutcome> {
        let title_id = sink.insert_row(
            &Row::new(Table::Title)
                .with("RunTime", movie.runtime)
                .with("OriginalTitle", movie.title.as_str())
                .with("StartYear", movie.year.map(|year| year.to_string()))
                .with("MediaType", MEDIA_TYPE_MOVIE)
                .with("Description", movie.description.as_str()),
        )?;
        let mut writes = 1;

        for genre in &movie.genres {
            sink.insert_row(
                &Row::new(Table::TitleGenre)
                    .with("TitleID", title_id)
                    .with("Genre", genre.as_str()),
            )?;
            writes += 1;
        }

        sink.insert_row(&rating_row(title_id, movie))?;
        writes += 1;

        if let Some(person_id) = find_person(sink, &movie.director)? {
            sink.insert_row(
                &Row::new(Table::Directed)
                    .with("TitleID", title_id)
                    .with("PersonID", person_id),
            )?;
            writes += 1;
        }

        for (position, actor) in movie.actors.iter().enumerate() {
            let Some(person_id) = find_person(sink, actor)? else {
                continue;
            };
            sink.insert_row(
                &Row::new(Table::PrincipalIn)
                    .with("TitleID", title_id)
                    .with("PersonID", person_id)
                    .with("Ordering", position as i64 + 1)
                    .with("Category", "actor"),
            )?;
            writes += 1;
        }

        Ok(MovieOutcome::Inserted { title_id, writes })
    }
}

fn rating_row(title_id: i64, movie: &MovieRecord) -> Row {
    Row::new(Table::Rating)
        .with("TitleID", title_id)
        .with("AverageRating", movie.rating)
        .with("VoteCount", movie.votes)
        .with("MetaScore", movie.metascore)
        .with("Revenue", movie.revenue)
}

/// First person with exactly this primary name
fn find_person(sink: &mut dyn RowSink, name: &str) -> Result<Option<i64>> {
    if name.is_empty() {
        return Ok(None);
    }
    match sink.query_row(Table::Person, &Filter::new().eq("PrimaryName", name))? {
        Some(person) => integer_field(&person, "PersonID").map(Some),
        None => {
            debug!(name, "No person with this name; link skipped");
            Ok(None)
        }
    }
}

impl Loader for MovieLoader {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(
        &self,
        input: &mut dyn BufRead,
        sink: &mut dyn RowSink,
        progress: &ProgressBar,
    ) -> Result<LoadStats> {
        let mut buf = String::new();
        if input.read_line(&mut buf)? == 0 {
            return Err(IngestError::MissingHeader);
        }

        let mut stats = LoadStats::default();
        let (mut updated, mut inserted) = (0u64, 0u64);
        let mut line = 1u64;
        loop {
            buf.clear();
            if input.read_line(&mut buf).map_err(|e| IngestError::from(e).at_line(line + 1))? == 0 {
                break;
            }
            line += 1;

            let movie = MovieRecord::parse(&buf).map_err(|e| e.at_line(line))?;
            let outcome = self.store(&movie, sink).map_err(|e| e.at_line(line))?;
            trace!(line, rank = movie.rank, ?outcome, "Movie stored");

            match outcome {
                MovieOutcome::Updated { .. } => updated += 1,
                MovieOutcome::Inserted { .. } => inserted += 1,
            }
            stats.records += 1;
            stats.rows += outcome.writes();
            progress.inc(1);
        }

        info!(updated, inserted, "Merged movie dataset");
        Ok(stats)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use std::io::Cursor;

    const HEADER: &str = "Rank,Title,Genre,Description,Director,Actors,Year,Runtime (Minutes),Rating,Votes,Revenue (Millions),Metascore\n";
    const GUARDIANS: &str = "1,Guardians of the Galaxy,\"Action,Adventure,Sci-Fi\",A group of intergalactic criminals are forced to work together.,James Gunn,\"Chris Pratt, Vin Diesel, Bradley Cooper, Zoe Saldana\",2014,121,8.1,757074,333.13,76";
    const PROMETHEUS: &str = "2,Prometheus,\"Adventure,Mystery,Sci-Fi\",\"Following clues to the origin of mankind, a team finds a structure on a distant moon.\",Ridley Scott,\"Noomi Rapace, Logan Marshall-Green\",2012,124,7.0,485820,126.46,";

    fn existing_title(sink: &mut MemorySink, id: i64, title: &'static str, year: &'static str, runtime: i64) {
        sink.insert_row(
            &Row::new(Table::Title)
                .with("TitleID", id)
                .with("RunTime", runtime)
                .with("OriginalTitle", title)
                .with("StartYear", year)
                .with("EndYear", SqlValue::Null)
                .with("MediaType", "movie"),
        )
        .unwrap();
    }

    fn person(sink: &mut MemorySink, id: i64, name: &'static str) {
        sink.insert_row(&Row::new(Table::Person).with("PersonID", id).with("PrimaryName", name))
            .unwrap();
    }

    #[test]
    fn test_parse_line() {
        let movie = MovieRecord::parse(GUARDIANS).unwrap();
        assert_eq!(movie.rank, 1);
        assert_eq!(movie.title, "Guardians of the Galaxy");
        assert_eq!(movie.genres, vec!["Action", "Adventure", "Sci-Fi"]);
        assert_eq!(movie.director, "James Gunn");
        assert_eq!(movie.actors[1], "Vin Diesel");
        assert_eq!(movie.actors.len(), 4);
        assert_eq!(movie.year, Some(2014));
        assert_eq!(movie.runtime, Some(121));
        assert_eq!(movie.rating, Some(8.1));
        assert_eq!(movie.votes, Some(757074));
        assert_eq!(movie.revenue, Some(333.13));
        assert_eq!(movie.metascore, Some(76.0));
    }

    #[test]
    fn test_parse_quoted_description_and_empty_numbers() {
        let movie = MovieRecord::parse(PROMETHEUS).unwrap();
        assert!(movie.description.contains("mankind, a team"));
        assert_eq!(movie.metascore, None);
        assert_eq!(movie.revenue, Some(126.46));
    }

    #[test]
    fn test_parse_wrong_column_count() {
        let err = MovieRecord::parse("1,Too Short,Drama").unwrap_err();
        assert!(matches!(err, IngestError::RowShapeMismatch { expected: 12, actual: 3 }));
    }

    #[test]
    fn test_parse_bad_number() {
        let line = GUARDIANS.replace(",121,", ",two hours,");
        let err = MovieRecord::parse(&line).unwrap_err();
        assert!(matches!(&err, IngestError::Column { column, .. } if column == "runtime"));
    }

    #[test]
    fn test_parse_unterminated_quote() {
        let err = MovieRecord::parse("1,\"Broken,Drama").unwrap_err();
        assert!(matches!(err, IngestError::MalformedField { .. }));
    }

    #[test]
    fn test_matching_title_is_updated() {
        let mut sink = MemorySink::new();
        existing_title(&mut sink, 2015381, "Guardians of the Galaxy", "2014", 121);
        sink.insert_row(
            &Row::new(Table::Rating)
                .with("TitleID", 2015381i64)
                .with("AverageRating", 8.0)
                .with("VoteCount", 1_000_000i64),
        )
        .unwrap();

        let movie = MovieRecord::parse(GUARDIANS).unwrap();
        let outcome = MovieLoader::default().store(&movie, &mut sink).unwrap();

        assert!(matches!(outcome, MovieOutcome::Updated { title_id: 2015381, .. }));
        assert_eq!(sink.count(Table::Title), 1);
        assert_eq!(sink.count(Table::TitleGenre), 0);
        let title = &sink.rows()[0];
        assert!(matches!(title.get("Description"), Some(SqlValue::Text(d)) if d.starts_with("A group")));
        let rating = &sink.rows()[1];
        assert_eq!(rating.get("MetaScore"), Some(&SqlValue::Real(76.0)));
        assert_eq!(rating.get("Revenue"), Some(&SqlValue::Real(333.13)));
        assert_eq!(rating.get("VoteCount"), Some(&SqlValue::Integer(1_000_000)));
    }

    #[test]
    fn test_matching_title_without_rating_gets_one() {
        let mut sink = MemorySink::new();
        existing_title(&mut sink, 7, "Guardians of the Galaxy", "2014", 121);

        let movie = MovieRecord::parse(GUARDIANS).unwrap();
        MovieLoader::default().store(&movie, &mut sink).unwrap();

        let rating = sink.rows_in(Table::Rating).next().unwrap();
        assert_eq!(rating.get("TitleID"), Some(&SqlValue::Integer(7)));
        assert_eq!(rating.get("AverageRating"), Some(&SqlValue::Real(8.1)));
    }

    #[test]
    fn test_different_runtime_is_a_new_title() {
        let mut sink = MemorySink::new();
        existing_title(&mut sink, 100, "Guardians of the Galaxy", "2014", 90);
        person(&mut sink, 1, "James Gunn");
        person(&mut sink, 2, "Vin Diesel");

        let movie = MovieRecord::parse(GUARDIANS).unwrap();
        let outcome = MovieLoader::default().store(&movie, &mut sink).unwrap();

        let MovieOutcome::Inserted { title_id, writes } = outcome else {
            panic!("expected insert, got {outcome:?}");
        };
        assert_eq!(title_id, 101);
        // title + 3 genres + rating + director + one known actor
        assert_eq!(writes, 7);
        assert_eq!(sink.count(Table::TitleGenre), 3);

        let directed = sink.rows_in(Table::Directed).next().unwrap();
        assert_eq!(directed.get("PersonID"), Some(&SqlValue::Integer(1)));
        let principal = sink.rows_in(Table::PrincipalIn).next().unwrap();
        assert_eq!(principal.get("PersonID"), Some(&SqlValue::Integer(2)));
        assert_eq!(principal.get("Ordering"), Some(&SqlValue::Integer(2)));
        assert_eq!(principal.get("Category"), Some(&SqlValue::from("actor")));
    }

    #[test]
    fn test_load_file() {
        let input = format!("{HEADER}{GUARDIANS}\n{PROMETHEUS}\n");
        let mut sink = MemorySink::new();
        existing_title(&mut sink, 1446714, "Prometheus", "2012", 124);

        let stats = MovieLoader::default()
            .load(&mut Cursor::new(input), &mut sink, &ProgressBar::hidden())
            .unwrap();

        assert_eq!(stats.records, 2);
        assert_eq!(sink.count(Table::Title), 2);
        assert_eq!(sink.count(Table::Rating), 2);
    }

    #[test]
    fn test_load_reports_failing_line() {
        let input = format!("{HEADER}{GUARDIANS}\n1,\"unterminated\n");
        let mut sink = MemorySink::new();
        let err = MovieLoader::default()
            .load(&mut Cursor::new(input), &mut sink, &ProgressBar::hidden())
            .unwrap_err();

        assert_eq!(err.line(), Some(3));
        assert!(matches!(err.root(), IngestError::MalformedField { .. }));
    }

    #[test]
    fn test_loader_is_named_after_its_file() {
        assert_eq!(MovieLoader::default().name(), MOVIES_FILE_NAME);
        assert_eq!(MovieLoader::new("kaggle-2016.csv").name(), "kaggle-2016.csv");
    }
}
