//! BASE dump reduction pipeline.
//!
//! Scans a dump directory in name order, decompresses each selected `ListRecords` file
//! and hands its content to the [Scheduler]. Files whose reduced counterpart already exists
//! are skipped unless overwriting is requested, which makes interrupted runs resumable.
use std::path::PathBuf;
use std::time::Duration;

use log::{debug, error, info, warn};

use super::dump::{DumpFile, SequenceRange};
use super::scheduler::{Report, Scheduler};
use super::worker::{BatchWorker, WorkUnit};
use crate::error::Error;
use crate::pipeline::Pipeline;

pub struct Reduce {
    src: PathBuf,
    dst: PathBuf,
    processes: usize,
    range: SequenceRange,
    overwrite: bool,
    poll_interval: Duration,
}

impl Reduce {
    pub fn new(
        src: PathBuf,
        dst: PathBuf,
        processes: usize,
        range: SequenceRange,
        overwrite: bool,
        poll_interval: Duration,
    ) -> Self {
        Self {
            src,
            dst,
            processes,
            range,
            overwrite,
            poll_interval,
        }
    }

    /// List dump files of the source folder, sorted by name.
    fn dump_files(&self) -> Result<Vec<DumpFile>, Error> {
        let mut paths = std::fs::read_dir(&self.src)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()?;
        paths.sort();

        Ok(paths
            .into_iter()
            .filter_map(|path| {
                let dump = DumpFile::from_path(&path);
                if dump.is_none() {
                    debug!("ignoring {:?}", path);
                }
                dump
            })
            .collect())
    }
}

impl Pipeline<Report> for Reduce {
    fn run(&self) -> Result<Report, Error> {
        if !self.dst.exists() {
            warn!("Destination folder does not exist. Creating");
            std::fs::create_dir_all(&self.dst)?;
        }

        let dumps = self.dump_files()?;
        info!(
            "Processing ListRecords with {} concurrent workers, start index {}, end index {}",
            self.processes,
            self.range.start,
            self.range
                .end
                .map_or_else(|| "inf".to_string(), |e| e.to_string())
        );

        let worker = BatchWorker::new(&self.dst);
        let mut scheduler = Scheduler::new(worker, self.processes, self.poll_interval)?;
        let mut unreadable = Vec::new();
        let mut skipped = 0;

        for dump in dumps {
            if !self.range.contains(dump.sequence()) {
                continue;
            }
            if !self.overwrite && dump.output_path(&self.dst).is_file() {
                debug!("{}: already reduced, skipping", dump.name());
                skipped += 1;
                continue;
            }

            let content = match dump.read() {
                Ok(c) => c,
                Err(e) => {
                    error!("{:?}: could not read dump file: {}", dump.path(), e);
                    unreadable.push(dump.name().to_string());
                    continue;
                }
            };

            scheduler.submit(WorkUnit::new(
                dump.name().to_string(),
                dump.sequence(),
                content,
            ))?;
        }

        let mut report = scheduler.drain()?;
        report.dropped.extend(unreadable);

        if skipped > 0 {
            info!("{} files were already reduced", skipped);
        }
        if !report.dropped.is_empty() {
            warn!(
                "{} dump files have no reduced output: {:?}",
                report.dropped.len(),
                report.dropped
            );
        }
        info!("Done! {} files reduced", report.completed);

        Ok(report)
    }
}
