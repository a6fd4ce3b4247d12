//! The per-file pipeline and the loop that drives it over a directory.

use super::conversion::Conversion;
use super::naming::Job;
use super::report::{BatchReport, ConvertedFile, FailedFile};
use crate::error::BatchError;
use crate::listing::DirectoryListing;
use crate::notify::Notifier;
use crate::picker::DirectoryPicker;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use vidbatch_av::{MediaSession, Marker};

/// Run the conversion pipeline for one job.
///
/// The session is driven in a fixed order: load, marker A, filters, codec,
/// container, save, then the still at marker B.
pub fn convert<S: MediaSession + ?Sized>(
    session: &mut S,
    job: &Job,
    conversion: &Conversion,
) -> vidbatch_av::Result<()> {
    session.load(&job.source())?;
    session.set_marker(Marker::A, conversion.first_frame)?;

    for filter in conversion.filters() {
        debug!("Adding filter {}", filter);
        session.add_filter(filter)?;
    }

    session.select_codec(conversion.codec.clone())?;
    session.set_container(conversion.container)?;
    session.save(&job.video_output)?;

    let still_frame = session.marker(Marker::B)?;
    session.set_current_frame(still_frame)?;
    session.export_still(&job.image_output)?;

    Ok(())
}

fn log_skipped(conversion: &Conversion, name: &str) {
    if conversion.is_earlier_output(name) {
        warn!("Skipping {}: it already carries an output suffix", name);
    } else {
        debug!("Skipping {}", name);
    }
}

/// Plan the jobs for `dir` without touching any media.
pub fn plan(
    dir: &Path,
    conversion: &Conversion,
    listing: &dyn DirectoryListing,
) -> Result<BatchReport, BatchError> {
    let mut report = BatchReport::new(dir.to_path_buf(), true);

    for name in listing.entries(dir)? {
        if !conversion.selects(&name) {
            log_skipped(conversion, &name);
            report.skipped += 1;
            continue;
        }
        match Job::plan(dir, &name, &conversion.naming) {
            Ok(job) => report.converted.push(ConvertedFile::from(&job)),
            Err(e) => report.failed.push(FailedFile {
                source: name,
                error: e.to_string(),
            }),
        }
    }

    Ok(report)
}

/// Converts every matching file of a directory, one at a time.
pub struct BatchConverter<'a, S, L, N> {
    conversion: &'a Conversion,
    session: S,
    listing: L,
    notifier: N,
}

impl<'a, S, L, N> BatchConverter<'a, S, L, N>
where
    S: MediaSession,
    L: DirectoryListing,
    N: Notifier,
{
    pub fn new(conversion: &'a Conversion, session: S, listing: L, notifier: N) -> Self {
        Self {
            conversion,
            session,
            listing,
            notifier,
        }
    }

    /// Ask `picker` for the directory, then convert it.
    ///
    /// # Errors
    ///
    /// Only selection and enumeration failures end the batch. They are
    /// reported through the notifier before being returned. Failures of
    /// single files are reported and recorded in the returned report.
    pub fn run(&mut self, picker: &dyn DirectoryPicker) -> Result<BatchReport, BatchError> {
        let dir = picker.pick().inspect_err(|e| self.fatal(e))?;
        self.run_in(&dir)
    }

    /// Convert every matching file in `dir`.
    pub fn run_in(&mut self, dir: &Path) -> Result<BatchReport, BatchError> {
        let entries = self.listing.entries(dir).inspect_err(|e| self.fatal(e))?;

        info!("Converting videos in {}", dir.display());
        let mut report = BatchReport::new(dir.to_path_buf(), false);

        for name in entries {
            if !self.conversion.selects(&name) {
                log_skipped(self.conversion, &name);
                report.skipped += 1;
                continue;
            }

            match self.convert_one(dir, &name) {
                Ok(converted) => report.converted.push(converted),
                Err(e) => {
                    error!("{}", e);
                    self.notifier.error(&e.to_string());
                    report.failed.push(FailedFile {
                        source: name,
                        error: e.to_string(),
                    });
                }
            }
        }

        if !report.failed.is_empty() {
            warn!(
                "{} of {} videos failed",
                report.failed.len(),
                report.failed.len() + report.converted.len()
            );
        }
        self.notifier.info(&report.summary());
        Ok(report)
    }

    fn fatal(&self, e: &BatchError) {
        error!("{}", e);
        self.notifier.error(&e.to_string());
    }

    fn convert_one(&mut self, dir: &Path, name: &str) -> Result<ConvertedFile, BatchError> {
        let job = Job::plan(dir, name, &self.conversion.naming)?;
        info!("Converting {}", name);
        let started = Instant::now();

        convert(&mut self.session, &job, self.conversion)
            .map_err(|source| BatchError::conversion(dir, name, source))?;

        info!(
            "Converted {} -> {} in {:.1}s",
            name,
            job.video_output.display(),
            started.elapsed().as_secs_f64()
        );
        Ok(ConvertedFile::from(&job))
    }

    /// Give back the session, e.g. to inspect a test double.
    pub fn into_session(self) -> S {
        self.session
    }
}
