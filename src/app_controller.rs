use anyhow::Result;
use log::{debug, error, info};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::errors::MergeError;
use crate::file_utils::FileManager;
use crate::gpx::{DocumentBuilder, GpxDocument, PointKind};
use crate::merge::TrackMerger;
use crate::timestamp::Instant;

// @module: Application controller for GPX merging

/// Outcome of a successful merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    // @field: File the merged document was written to
    pub output: PathBuf,

    // @field: Number of input documents processed
    pub documents: usize,

    // @field: Points written to the output
    pub total_points: usize,

    // @field: Track points among them
    pub track_points: usize,

    // @field: Waypoints among them
    pub waypoints: usize,

    // @field: Points dropped for missing or invalid time
    pub skipped_points: usize,
}

impl fmt::Display for MergeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Merged GPX file created: {}", self.output.display())?;
        write!(f, "Total track points merged: {}", self.total_points)
    }
}

/// Main application controller for GPX merging
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Fixed generation time, clock when unset
    generated_at: Option<Instant>,
}

impl Controller {
    /// Create a controller with the default configuration
    pub fn new_default() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            generated_at: None,
        })
    }

    /// Stamp merged documents with a fixed time instead of the clock
    pub fn with_generation_time(mut self, instant: Instant) -> Self {
        self.generated_at = Some(instant);
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Document builder configured from the output settings
    pub fn document_builder(&self) -> DocumentBuilder {
        let builder = DocumentBuilder::new(self.config.output.clone());
        match self.generated_at {
            Some(instant) => builder.with_generation_time(instant),
            None => builder,
        }
    }

    /// Load every input in order and return the sorted merge.
    ///
    /// All inputs are checked for existence before any is parsed. The first
    /// document that cannot be read or is not well-formed aborts the merge.
    pub fn merge_files(&self, inputs: &[PathBuf]) -> Result<TrackMerger> {
        if inputs.is_empty() {
            return Err(MergeError::NoInputFiles.into());
        }

        if let Some(missing) = inputs.iter().find(|path| !FileManager::file_exists(path)) {
            return Err(MergeError::MissingInput(missing.clone()).into());
        }

        let mut merger = TrackMerger::new();
        for (index, input) in inputs.iter().enumerate() {
            info!("Processing: {}", input.display());
            let document = GpxDocument::load(input, index).map_err(|e| {
                error!(
                    "Stopping at document {} of {}: {}",
                    index + 1,
                    inputs.len(),
                    e.path().display()
                );
                MergeError::from(e)
            })?;
            let report = merger.add_document(&document);
            debug!(
                "Added {} point(s) from {}",
                report.track_points + report.waypoints,
                input.display()
            );
        }

        merger.sort_by_timestamp();
        Ok(merger)
    }

    /// Merge inputs and return the serialized document without writing it
    pub fn merge_to_document(&self, inputs: &[PathBuf]) -> Result<Vec<u8>> {
        let merger = self.merge_files(inputs)?;
        let bytes = self
            .document_builder()
            .build_bytes(merger.points(), merger.metadata(), merger.namespaces())?;
        Ok(bytes)
    }

    /// Run the main workflow: merge all inputs and write the result to `output`.
    ///
    /// Nothing is written when no usable point was found.
    pub fn run(&self, inputs: &[PathBuf], output: &Path) -> Result<MergeSummary> {
        let start_time = std::time::Instant::now();

        let merger = self.merge_files(inputs)?;
        let bytes = self
            .document_builder()
            .build_bytes(merger.points(), merger.metadata(), merger.namespaces())?;

        FileManager::write_bytes(output, &bytes).map_err(|e| MergeError::Output {
            path: output.to_path_buf(),
            message: format!("{:#}", e),
        })?;

        let summary = MergeSummary {
            output: output.to_path_buf(),
            documents: merger.document_count(),
            total_points: merger.len(),
            track_points: merger.count_of(PointKind::TrackPoint),
            waypoints: merger.count_of(PointKind::Waypoint),
            skipped_points: merger.skipped_count(),
        };

        debug!(
            "Wrote {} point(s) to {}: {} track point(s), {} waypoint(s), {} skipped, done in {:.2?}",
            summary.total_points,
            summary.output.display(),
            summary.track_points,
            summary.waypoints,
            summary.skipped_points,
            start_time.elapsed()
        );

        Ok(summary)
    }
}
