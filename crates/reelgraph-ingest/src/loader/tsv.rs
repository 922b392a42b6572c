//! Loader for the tab-separated dumps

use std::io::BufRead;
use std::sync::Arc;

use indicatif::ProgressBar;
use tracing::{debug, trace};

use super::{fan_out, LoadStats, Loader};
use crate::decoder::TypedRecord;
use crate::error::Result;
use crate::reader::RecordReader;
use crate::schema::Schema;
use crate::sink::{Row, RowSink};

/// The kinds of tab-separated dump, each with a fixed row shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsvSource {
    TitleBasics,
    NameBasics,
    TitleCrew,
    TitleEpisode,
    TitleAkas,
    TitlePrincipals,
    TitleRatings,
}

impl TsvSource {
    /// Import order: titles and people first, since later files reference them
    pub const ALL: [TsvSource; 7] = [
        TsvSource::TitleBasics,
        TsvSource::NameBasics,
        TsvSource::TitleCrew,
        TsvSource::TitleEpisode,
        TsvSource::TitleAkas,
        TsvSource::TitlePrincipals,
        TsvSource::TitleRatings,
    ];

    /// Conventional file name in the data directory
    pub fn file_name(self) -> &'static str {
        match self {
            TsvSource::TitleBasics => "title.basics.tsv",
            TsvSource::NameBasics => "name.basics.tsv",
            TsvSource::TitleCrew => "title.crew.tsv",
            TsvSource::TitleEpisode => "title.episode.tsv",
            TsvSource::TitleAkas => "title.akas.tsv",
            TsvSource::TitlePrincipals => "title.principals.tsv",
            TsvSource::TitleRatings => "title.ratings.tsv",
        }
    }

    /// Rows implied by one record of this kind
    pub fn fan_out(self, record: &TypedRecord) -> Result<Vec<Row>> {
        match self {
            TsvSource::TitleBasics => fan_out::title_rows(record),
            TsvSource::NameBasics => fan_out::person_rows(record),
            TsvSource::TitleCrew => fan_out::crew_rows(record),
            TsvSource::TitleEpisode => fan_out::episode_rows(record),
            TsvSource::TitleAkas => fan_out::region_info_rows(record),
            TsvSource::TitlePrincipals => fan_out::principal_rows(record),
            TsvSource::TitleRatings => fan_out::rating_rows(record),
        }
    }
}

/// Decodes a dump through the schema and writes its fan-out rows
pub struct TsvLoader {
    source: TsvSource,
    schema: Arc<Schema>,
}

impl TsvLoader {
    pub fn new(source: TsvSource, schema: Arc<Schema>) -> Self {
        Self { source, schema }
    }

    pub fn source(&self) -> TsvSource {
        self.source
    }
}

impl Loader for TsvLoader {
    fn name(&self) -> &str {
        self.source.file_name()
    }

    fn load(
        &self,
        input: &mut dyn BufRead,
        sink: &mut dyn RowSink,
        progress: &ProgressBar,
    ) -> Result<LoadStats> {
        let reader = RecordReader::new(input, &self.schema)?;
        debug!(
            source = self.name(),
            columns = ?reader.decoder().column_names().collect::<Vec<_>>(),
            "Decoded header"
        );

        let mut stats = LoadStats::default();
        for item in reader {
            let (line, record) = item?;
            let rows = self.source.fan_out(&record).map_err(|e| e.at_line(line))?;
            for row in &rows {
                sink.insert_row(row).map_err(|e| e.at_line(line))?;
            }
            trace!(line, rows = rows.len(), "Record loaded");

            stats.records += 1;
            stats.rows += rows.len() as u64;
            progress.inc(1);
        }
        Ok(stats)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use crate::sink::{MemorySink, SqlValue, Table};
    use std::io::Cursor;

    fn load(source: TsvSource, input: &str, sink: &mut MemorySink) -> Result<LoadStats> {
        TsvLoader::new(source, Arc::new(Schema::imdb())).load(
            &mut Cursor::new(input),
            sink,
            &ProgressBar::hidden(),
        )
    }

    #[test]
    fn test_title_basics_emits_primary_then_genres() {
        let input = "tconst\ttitleType\tprimaryTitle\toriginalTitle\tisAdult\tstartYear\tendYear\truntimeMinutes\tgenres\n\
                     tt0000001\tshort\tCarmencita\tCarmencita\t0\t1894\t\\N\t1\tDocumentary,Short\n\
                     tt0000002\tshort\tLe clown et ses chiens\tLe clown et ses chiens\t0\t1892\t\\N\t5\t\\N\n";
        let mut sink = MemorySink::new();
        let stats = load(TsvSource::TitleBasics, input, &mut sink).unwrap();

        assert_eq!(stats, LoadStats { records: 2, rows: 4 });
        let tables: Vec<Table> = sink.rows().iter().map(Row::table).collect();
        assert_eq!(
            tables,
            vec![Table::Title, Table::TitleGenre, Table::TitleGenre, Table::Title]
        );
        assert_eq!(sink.rows()[3].get("TitleID"), Some(&SqlValue::Integer(2)));
    }

    #[test]
    fn test_name_basics() {
        let input = "nconst\tprimaryName\tbirthYear\tdeathYear\tprimaryProfession\tknownForTitles\n\
                     nm0000001\tFred Astaire\t1899\t1987\tsoundtrack,actor,miscellaneous,producer\ttt0072308,tt0050419\n";
        let mut sink = MemorySink::new();
        load(TsvSource::NameBasics, input, &mut sink).unwrap();

        assert_eq!(sink.count(Table::Person), 1);
        assert_eq!(sink.count(Table::KnownFor), 2);
        let person = &sink.rows()[0];
        assert_eq!(person.get("PrimaryProfession3"), Some(&SqlValue::from("miscellaneous")));
        assert_eq!(person.get("BirthYear"), Some(&SqlValue::from("1899")));
    }

    #[test]
    fn test_ratings_file() {
        let input = "tconst\taverageRating\tnumVotes\ntt0000001\t5.7\t1965\n";
        let mut sink = MemorySink::new();
        load(TsvSource::TitleRatings, input, &mut sink).unwrap();
        assert_eq!(sink.rows()[0].table(), Table::Rating);
        assert_eq!(sink.rows()[0].get("AverageRating"), Some(&SqlValue::Real(5.7)));
    }

    #[test]
    fn test_first_bad_line_stops_the_load() {
        let input = "tconst\taverageRating\tnumVotes\n\
                     tt0000001\t5.7\t1965\n\
                     tt0000002\tgood\t10\n\
                     tt0000003\t6.5\t2000\n";
        let mut sink = MemorySink::new();
        let err = load(TsvSource::TitleRatings, input, &mut sink).unwrap_err();

        assert_eq!(err.line(), Some(3));
        assert!(matches!(err.root(), IngestError::TypeMismatch { .. }));
        assert_eq!(sink.count(Table::Rating), 1);
    }

    #[test]
    fn test_every_source_has_a_distinct_file() {
        let mut names: Vec<&str> = TsvSource::ALL.iter().map(|s| s.file_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), TsvSource::ALL.len());
    }
}
