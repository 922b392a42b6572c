//! SQLite schema for the imported graph

use rusqlite::Connection;

use crate::error::Result;

/// Create every table and index if missing
///
/// Foreign keys are declared for documentation only. Dumps routinely
/// reference titles and people they never define, so the connection turns
/// enforcement off (see `SqliteSink::with_connection`).
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS Title (
            TitleID INTEGER PRIMARY KEY,
            RunTime INTEGER,
            OriginalTitle TEXT,
            StartYear TEXT,
            EndYear TEXT,
            MediaType TEXT,
            Description TEXT
        );

        CREATE TABLE IF NOT EXISTS TitleGenre (
            TitleID INTEGER NOT NULL REFERENCES Title(TitleID),
            Genre TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS Person (
            PersonID INTEGER PRIMARY KEY,
            PrimaryName TEXT,
            BirthYear TEXT,
            DeathYear TEXT,
            PrimaryProfession1 TEXT,
            PrimaryProfession2 TEXT,
            PrimaryProfession3 TEXT
        );

        CREATE TABLE IF NOT EXISTS KnownFor (
            TitleID INTEGER NOT NULL REFERENCES Title(TitleID),
            PersonID INTEGER NOT NULL REFERENCES Person(PersonID)
        );

        CREATE TABLE IF NOT EXISTS Wrote (
            TitleID INTEGER NOT NULL REFERENCES Title(TitleID),
            PersonID INTEGER NOT NULL REFERENCES Person(PersonID)
        );

        CREATE TABLE IF NOT EXISTS Directed (
            TitleID INTEGER NOT NULL REFERENCES Title(TitleID),
            PersonID INTEGER NOT NULL REFERENCES Person(PersonID)
        );

        CREATE TABLE IF NOT EXISTS EpisodeOf (
            TitleID INTEGER PRIMARY KEY REFERENCES Title(TitleID),
            ParentTitleID INTEGER REFERENCES Title(TitleID),
            SeasonNumber INTEGER,
            EpisodeNumber INTEGER
        );

        CREATE TABLE IF NOT EXISTS RegionInfo (
            TitleID INTEGER NOT NULL REFERENCES Title(TitleID),
            Ordering INTEGER NOT NULL,
            Region TEXT,
            Title TEXT,
            Language TEXT,
            IsOriginalTitle INTEGER,
            PRIMARY KEY (TitleID, Ordering)
        );

        CREATE TABLE IF NOT EXISTS PrincipalIn (
            TitleID INTEGER NOT NULL REFERENCES Title(TitleID),
            PersonID INTEGER NOT NULL REFERENCES Person(PersonID),
            Ordering INTEGER NOT NULL,
            Category TEXT,
            Job TEXT,
            Characters TEXT,
            PRIMARY KEY (TitleID, Ordering)
        );

        CREATE TABLE IF NOT EXISTS Rating (
            TitleID INTEGER PRIMARY KEY REFERENCES Title(TitleID),
            AverageRating REAL,
            VoteCount INTEGER,
            MetaScore REAL,
            Revenue REAL
        );

        CREATE INDEX IF NOT EXISTS idx_title_natural_key
            ON Title(OriginalTitle, StartYear);
        CREATE INDEX IF NOT EXISTS idx_person_name ON Person(PrimaryName);
        "#,
    )?;

    Ok(())
}
