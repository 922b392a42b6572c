//! Sequential job runner
//!
//! Each [`Job`] pairs a source file with its [`Loader`]. Jobs run strictly in
//! order and each file is one commit unit: a failing file is rolled back in
//! full and halts the run, while files committed before it stay committed.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::error::{IngestError, Result};
use crate::loader::{LoadStats, Loader, MovieLoader, TsvLoader, TsvSource};
use crate::progress;
use crate::schema::Schema;
use crate::sink::RowSink;

/// One source file and the loader that understands it
pub struct Job {
    path: PathBuf,
    loader: Box<dyn Loader>,
}

impl Job {
    pub fn new(path: impl Into<PathBuf>, loader: Box<dyn Loader>) -> Self {
        Self {
            path: path.into(),
            loader,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        self.loader.name()
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("path", &self.path)
            .field("loader", &self.loader.name())
            .finish()
    }
}

/// The seven dumps in import order, optionally followed by the movie dataset
pub fn standard_jobs(data_dir: &Path, schema: Arc<Schema>, movies_file: Option<&str>) -> Vec<Job> {
    let mut jobs: Vec<Job> = TsvSource::ALL
        .into_iter()
        .map(|source| {
            Job::new(
                data_dir.join(source.file_name()),
                Box::new(TsvLoader::new(source, Arc::clone(&schema))),
            )
        })
        .collect();

    if let Some(file) = movies_file {
        jobs.push(Job::new(data_dir.join(file), Box::new(MovieLoader::new(file))));
    }
    jobs
}

/// Outcome of one committed job
#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub file: PathBuf,
    pub stats: LoadStats,
    pub elapsed: Duration,
}

/// Totals across every committed job
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub jobs: Vec<JobReport>,
}

impl RunSummary {
    pub fn records(&self) -> u64 {
        self.jobs.iter().map(|job| job.stats.records).sum()
    }

    pub fn rows(&self) -> u64 {
        self.jobs.iter().map(|job| job.stats.rows).sum()
    }
}

#[derive(Debug, Clone)]
pub struct JobRunner {
    show_progress: bool,
}

impl Default for JobRunner {
    fn default() -> Self {
        Self { show_progress: true }
    }
}

impl JobRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Run `jobs` in order against `sink`, stopping at the first failure
    ///
    /// # Errors
    /// The first job error, wrapped as [`IngestError::Job`] with the file path.
    pub fn run(&self, jobs: &[Job], sink: &mut dyn RowSink) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for job in jobs {
            let report = self.run_job(job, sink).map_err(|e| {
                let err = e.in_file(job.path());
                error!(
                    file = %job.path().display(),
                    line = err.line(),
                    kind = err.kind(),
                    error = %err.report(),
                    "Import job failed; its writes were rolled back"
                );
                err
            })?;
            summary.jobs.push(report);
        }

        info!(
            jobs = summary.jobs.len(),
            records = summary.records(),
            rows = summary.rows(),
            "Import run complete"
        );
        Ok(summary)
    }

    fn run_job(&self, job: &Job, sink: &mut dyn RowSink) -> Result<JobReport> {
        let started = Instant::now();
        info!(file = %job.path().display(), loader = job.name(), "Starting import job");

        let file = File::open(job.path())?;
        let mut input = BufReader::new(file);
        let pb = progress::record_spinner(job.name(), self.show_progress);

        sink.begin_unit()?;
        let loaded = job
            .loader
            .load(&mut input, sink, &pb)
            .and_then(|stats| sink.commit_unit().map(|()| stats));

        let stats = match loaded {
            Ok(stats) => stats,
            Err(e) => {
                progress::abandon_records(&pb);
                if let Err(rollback) = sink.rollback_unit() {
                    warn!(file = %job.path().display(), error = %rollback.report(), "Rollback failed");
                }
                return Err(e);
            }
        };

        progress::finish_records(&pb, job.name());
        let elapsed = started.elapsed();
        info!(
            file = %job.path().display(),
            records = stats.records,
            rows = stats.rows,
            elapsed_ms = elapsed.as_millis() as u64,
            "Import job committed"
        );

        Ok(JobReport {
            file: job.path().to_path_buf(),
            stats,
            elapsed,
        })
    }
}

/// Fail before any writes if a job's source file is missing
pub fn check_sources(jobs: &[Job]) -> Result<()> {
    match jobs.iter().find(|job| !job.path().is_file()) {
        Some(job) => Err(IngestError::config(format!(
            "source file {} not found",
            job.path().display()
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::sink::{MemorySink, Table};
    use std::fs;

    const RATINGS: &str = "tconst\taverageRating\tnumVotes\n\
                           tt0000001\t5.7\t1965\n\
                           tt0000002\t6.1\t263\n";

    // line 5 has a non-numeric season number
    const BAD_EPISODES: &str = "tconst\tparentTconst\tseasonNumber\tepisodeNumber\n\
                                tt0041951\ttt0041038\t1\t9\n\
                                tt0042816\ttt0989125\t1\t17\n\
                                tt0043426\ttt0040051\t3\t1\n\
                                tt0043427\ttt0040051\tthree\t2\n";

    fn schema() -> Arc<Schema> {
        Arc::new(Schema::imdb())
    }

    fn runner() -> JobRunner {
        JobRunner::new().show_progress(false)
    }

    #[test]
    fn test_standard_job_order() {
        let jobs = standard_jobs(Path::new("/data"), schema(), None);
        let names: Vec<&str> = jobs.iter().map(Job::name).collect();
        assert_eq!(names.first(), Some(&"title.basics.tsv"));
        assert_eq!(names.last(), Some(&"title.ratings.tsv"));
        assert_eq!(jobs.len(), 7);
        assert_eq!(jobs[1].path(), Path::new("/data/name.basics.tsv"));
    }

    #[test]
    fn test_movies_job_runs_last() {
        let jobs = standard_jobs(Path::new("/data"), schema(), Some("kaggle-2016.csv"));
        assert_eq!(jobs.len(), 8);
        assert_eq!(jobs[7].path(), Path::new("/data/kaggle-2016.csv"));
        assert_eq!(jobs[7].name(), "kaggle-2016.csv");
    }

    #[test]
    fn test_failed_file_is_rolled_back_and_halts_the_run() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ratings.tsv"), RATINGS).unwrap();
        fs::write(dir.path().join("episodes.tsv"), BAD_EPISODES).unwrap();
        fs::write(dir.path().join("more_ratings.tsv"), RATINGS).unwrap();

        let jobs = vec![
            Job::new(
                dir.path().join("ratings.tsv"),
                Box::new(TsvLoader::new(TsvSource::TitleRatings, schema())),
            ),
            Job::new(
                dir.path().join("episodes.tsv"),
                Box::new(TsvLoader::new(TsvSource::TitleEpisode, schema())),
            ),
            Job::new(
                dir.path().join("more_ratings.tsv"),
                Box::new(TsvLoader::new(TsvSource::TitleRatings, schema())),
            ),
        ];

        let mut sink = MemorySink::new();
        let err = runner().run(&jobs, &mut sink).unwrap_err();

        assert!(matches!(&err, IngestError::Job { file, .. } if file.ends_with("episodes.tsv")));
        assert_eq!(err.line(), Some(5));
        assert_eq!(err.kind(), "type_mismatch");
        assert_eq!(sink.count(Table::Rating), 2);
        assert_eq!(sink.count(Table::EpisodeOf), 0);
        assert!(!sink.in_unit());
    }

    #[test]
    fn test_summary_totals() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ratings.tsv"), RATINGS).unwrap();
        let jobs = vec![Job::new(
            dir.path().join("ratings.tsv"),
            Box::new(TsvLoader::new(TsvSource::TitleRatings, schema())),
        )];

        let mut sink = MemorySink::new();
        let summary = runner().run(&jobs, &mut sink).unwrap();

        assert_eq!(summary.jobs.len(), 1);
        assert_eq!(summary.records(), 2);
        assert_eq!(summary.rows(), 2);
        assert!(!sink.in_unit());
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let jobs = vec![Job::new(
            "/nonexistent/title.ratings.tsv",
            Box::new(TsvLoader::new(TsvSource::TitleRatings, schema())),
        )];
        let err = runner().run(&jobs, &mut MemorySink::new()).unwrap_err();
        assert_eq!(err.kind(), "io");
    }

    #[test]
    fn test_check_sources() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = standard_jobs(dir.path(), schema(), None);
        let err = check_sources(&jobs).unwrap_err();
        assert!(err.to_string().contains("title.basics.tsv"));

        for job in &jobs {
            fs::write(job.path(), "").unwrap();
        }
        assert!(check_sources(&jobs).is_ok());
    }
}
