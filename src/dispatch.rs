//! Parallel extraction over a file list.
//!
//! Workers run on a dedicated rayon pool and send finished records back over
//! a channel. The calling thread drains the channel and hands each record to a
//! [`RecordSink`] in completion order, so it stays the only writer of output.

use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::output::{OutputError, RecordSink};
use crate::record::{Extractor, Record};

/// A record together with the path it was extracted from.
#[derive(Debug)]
pub struct Completed {
    pub path: PathBuf,
    pub record: Record,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Fans files out to a bounded worker pool.
#[derive(Clone)]
pub struct Dispatcher {
    extractor: Extractor,
    jobs: Option<usize>,
    progress: bool,
}

impl Dispatcher {
    pub fn new(extractor: Extractor) -> Self {
        Self {
            extractor,
            jobs: None,
            progress: true,
        }
    }

    /// Worker count. `None` or `Some(0)` uses the available parallelism.
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Show a progress bar on stderr (only drawn when stderr is a terminal).
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Extract every file and deliver each record to `sink`.
    ///
    /// Returns once every worker has finished. A sink error stops delivery;
    /// workers still drain but their records are dropped.
    pub fn run(&self, files: &[PathBuf], sink: &mut dyn RecordSink) -> Result<usize, DispatchError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs.unwrap_or(0))
            .thread_name(|i| format!("gaussparse-worker-{i}"))
            .build()?;
        debug!(
            "Dispatching {} files to {} workers",
            files.len(),
            pool.current_num_threads()
        );

        let progress = self.progress_bar(files.len());
        let extractor = &self.extractor;
        let (tx, rx) = mpsc::channel::<Completed>();

        let mut delivered = 0;
        let result: Result<(), OutputError> = thread::scope(|scope| {
            scope.spawn(move || {
                pool.install(|| {
                    files.par_iter().for_each_with(tx, |tx, path| {
                        let record = extractor.extract(path);
                        // Ignore send errors (consumer may have stopped)
                        let _ = tx.send(Completed {
                            path: path.clone(),
                            record,
                        });
                    });
                });
            });

            for done in rx {
                progress.inc(1);
                sink.accept(&done.path, done.record)?;
                delivered += 1;
            }
            Ok(())
        });
        progress.finish_and_clear();

        result?;
        info!("Processed {} of {} files", delivered, files.len());
        Ok(delivered)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let style = ProgressStyle::with_template(
            "{msg} [{bar:40.cyan/blue}] {pos}/{len} [{elapsed_precise}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
        ProgressBar::new(len as u64)
            .with_style(style)
            .with_message("Processing log files")
    }
}
