//! Batch conversion of a demo session directory
//!
//! A session looks like `<session>/demos/<episode>/*.csv`. Every episode
//! folder except the gripper calibration runs is scanned for SLAM outputs,
//! which are recognised by file stem suffix and converted to PLY.

use crate::export::{ExportSummary, PointCloudExport, TrajectoryExport};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use slamply_core::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DEMOS_DIR: &str = "demos";
pub const CALIBRATION_PREFIX: &str = "gripper_calibration";
pub const TRAJECTORY_SUFFIX: &str = "absolute_camera_trajectory";
pub const POINT_CLOUD_SUFFIX: &str = "point_cloud";

/// What a CSV file contains, judged by its name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportKind {
    PointCloud,
    Trajectory,
}

impl ExportKind {
    /// Classify a path by extension and stem suffix
    pub fn classify(path: &Path) -> Option<Self> {
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        if stem.ends_with(TRAJECTORY_SUFFIX) {
            Some(ExportKind::Trajectory)
        } else if stem.ends_with(POINT_CLOUD_SUFFIX) {
            Some(ExportKind::PointCloud)
        } else {
            None
        }
    }
}

/// Where converted files are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputPlacement {
    /// A subdirectory of each episode folder
    EpisodeSubdir(String),
    /// Next to the source CSV
    Alongside,
    /// One shared directory for the whole session
    Directory(PathBuf),
}

impl Default for OutputPlacement {
    fn default() -> Self {
        OutputPlacement::EpisodeSubdir("ply".to_string())
    }
}

impl OutputPlacement {
    fn output_dir(&self, episode: &Path) -> PathBuf {
        match self {
            OutputPlacement::EpisodeSubdir(name) => episode.join(name),
            OutputPlacement::Alongside => episode.to_path_buf(),
            OutputPlacement::Directory(dir) => dir.clone(),
        }
    }
}

/// Session conversion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionOptions {
    pub placement: OutputPlacement,
    /// Episode folders starting with this prefix are skipped; empty skips nothing
    pub skip_prefix: String,
    pub point_cloud: PointCloudExport,
    pub trajectory: TrajectoryExport,
}

impl SessionOptions {
    pub fn new() -> Self {
        Self {
            placement: OutputPlacement::default(),
            skip_prefix: CALIBRATION_PREFIX.to_string(),
            point_cloud: PointCloudExport::new(),
            trajectory: TrajectoryExport::new(),
        }
    }

    pub fn with_placement(mut self, placement: OutputPlacement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_point_cloud(mut self, point_cloud: PointCloudExport) -> Self {
        self.point_cloud = point_cloud;
        self
    }

    pub fn with_trajectory(mut self, trajectory: TrajectoryExport) -> Self {
        self.trajectory = trajectory;
        self
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// A single pending conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub kind: ExportKind,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl ConversionJob {
    pub fn run(&self, options: &SessionOptions) -> Result<ExportSummary> {
        match self.kind {
            ExportKind::PointCloud => options.point_cloud.export(&self.input, &self.output),
            ExportKind::Trajectory => options.trajectory.export(&self.input, &self.output),
        }
    }
}

/// Everything a session conversion would do
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionPlan {
    pub jobs: Vec<ConversionJob>,
    /// Episode folders skipped by prefix
    pub skipped: Vec<PathBuf>,
}

impl SessionPlan {
    /// Output directories that have to exist before the jobs run
    pub fn output_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self
            .jobs
            .iter()
            .filter_map(|job| job.output.parent().map(Path::to_path_buf))
            .collect();
        dirs.sort();
        dirs.dedup();
        dirs
    }
}

/// Outcome of a session conversion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub converted: Vec<ExportSummary>,
    pub skipped: Vec<PathBuf>,
}

/// Sorted entries of a directory
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

/// Discover conversion jobs without writing anything
pub fn plan_session<P: AsRef<Path>>(session_dir: P, options: &SessionOptions) -> Result<SessionPlan> {
    let session_dir = session_dir.as_ref();
    if !session_dir.is_dir() {
        return Err(Error::InvalidData(format!(
            "Session directory {} is not a directory",
            session_dir.display()
        )));
    }

    let mut plan = SessionPlan::default();

    for episode in sorted_entries(&session_dir.join(DEMOS_DIR))? {
        if !episode.is_dir() {
            continue;
        }
        let name = episode.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if !options.skip_prefix.is_empty() && name.starts_with(&options.skip_prefix) {
            debug!("Skipping {}", episode.display());
            plan.skipped.push(episode);
            continue;
        }

        let output_dir = options.placement.output_dir(&episode);
        for input in sorted_entries(&episode)? {
            if !input.is_file() {
                continue;
            }
            let Some(kind) = ExportKind::classify(&input) else {
                continue;
            };
            let Some(stem) = input.file_stem() else {
                continue;
            };

            let mut file_name = stem.to_os_string();
            file_name.push(".ply");
            let output = output_dir.join(file_name);
            if plan.jobs.iter().any(|job| job.output == output) {
                warn!(
                    "{} maps to already planned output {}, skipping",
                    input.display(),
                    output.display()
                );
                continue;
            }
            plan.jobs.push(ConversionJob { kind, input, output });
        }
    }

    Ok(plan)
}

/// Convert every SLAM output in a session, in parallel
///
/// Each file is exported atomically. When any job fails the first failure in
/// plan order is returned; files converted by other jobs are kept.
pub fn convert_session<P: AsRef<Path>>(session_dir: P, options: &SessionOptions) -> Result<SessionReport> {
    let plan = plan_session(session_dir, options)?;

    for dir in plan.output_dirs() {
        fs::create_dir_all(&dir)?;
    }

    let converted = plan
        .jobs
        .par_iter()
        .map(|job| job.run(options))
        .collect::<Vec<_>>()
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

    info!(
        "Converted {} files, skipped {} episodes",
        converted.len(),
        plan.skipped.len()
    );

    Ok(SessionReport {
        converted,
        skipped: plan.skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableOptions;
    use slamply_core::Rgb;

    #[test]
    fn test_classify() {
        assert_eq!(
            ExportKind::classify(Path::new("a/ep_absolute_camera_trajectory.csv")),
            Some(ExportKind::Trajectory)
        );
        assert_eq!(
            ExportKind::classify(Path::new("absolute_camera_trajectory.csv")),
            Some(ExportKind::Trajectory)
        );
        assert_eq!(
            ExportKind::classify(Path::new("mapping_point_cloud.csv")),
            Some(ExportKind::PointCloud)
        );
        assert_eq!(ExportKind::classify(Path::new("point_cloud.ply")), None);
        assert_eq!(ExportKind::classify(Path::new("camera_trajectory.csv")), None);
        assert_eq!(ExportKind::classify(Path::new("point_cloud_2.csv")), None);
    }

    #[test]
    fn test_placement() {
        let episode = Path::new("/s/demos/ep1");
        assert_eq!(
            OutputPlacement::default().output_dir(episode),
            PathBuf::from("/s/demos/ep1/ply")
        );
        assert_eq!(
            OutputPlacement::Alongside.output_dir(episode),
            PathBuf::from("/s/demos/ep1")
        );
        assert_eq!(
            OutputPlacement::Directory(PathBuf::from("/out")).output_dir(episode),
            PathBuf::from("/out")
        );
    }

    #[test]
    fn test_output_dirs_dedup() {
        let plan = SessionPlan {
            jobs: vec![
                ConversionJob {
                    kind: ExportKind::PointCloud,
                    input: PathBuf::from("/a/x_point_cloud.csv"),
                    output: PathBuf::from("/a/ply/x_point_cloud.ply"),
                },
                ConversionJob {
                    kind: ExportKind::Trajectory,
                    input: PathBuf::from("/a/absolute_camera_trajectory.csv"),
                    output: PathBuf::from("/a/ply/absolute_camera_trajectory.ply"),
                },
            ],
            skipped: Vec::new(),
        };
        assert_eq!(plan.output_dirs(), vec![PathBuf::from("/a/ply")]);
    }

    #[test]
    fn test_options_json_round_trip() {
        let options = SessionOptions::new()
            .with_placement(OutputPlacement::Directory(PathBuf::from("/out")))
            .with_trajectory(TrajectoryExport::new().with_color(Rgb::new(255, 0, 0)))
            .with_point_cloud(
                PointCloudExport::new().with_table(TableOptions::csv().with_header_lines(0)),
            );

        let json = serde_json::to_string(&options).unwrap();
        let restored: SessionOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, options);
    }
}
