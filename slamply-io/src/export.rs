//! CSV to PLY export of SLAM map points and camera trajectories
//!
//! Both exports follow the same pipeline: read the whole numeric table, pick
//! three columns per row according to a [`ColumnLayout`], and write an ASCII
//! PLY file whose vertex count is the number of rows actually parsed. Nothing
//! is written unless every row parses, and the output replaces an existing
//! file only after it has been completely written.

use crate::layout::ColumnLayout;
use crate::ply::AsciiPlyWriter;
use crate::table::{NumericTableReader, TableOptions};
use serde::{Deserialize, Serialize};
use slamply_core::{ColoredPoint3d, Point3d, PointCloud, Result, Rgb};
use std::path::{Path, PathBuf};
use tracing::info;

/// Options for exporting map points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloudExport {
    pub table: TableOptions,
    pub layout: ColumnLayout,
}

impl PointCloudExport {
    pub fn new() -> Self {
        Self {
            table: TableOptions::csv(),
            layout: ColumnLayout::POINT_CLOUD,
        }
    }

    pub fn with_table(mut self, table: TableOptions) -> Self {
        self.table = table;
        self
    }

    pub fn with_layout(mut self, layout: ColumnLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Parse the input into positions without writing anything
    pub fn read<P: AsRef<Path>>(&self, input: P) -> Result<PointCloud<Point3d>> {
        let table = NumericTableReader::read(input, &self.table)?;
        table.iter().map(|row| self.layout.extract(row)).collect()
    }

    #[tracing::instrument(skip_all, fields(input = %input.as_ref().display(), output = %output.as_ref().display()))]
    pub fn export<P: AsRef<Path>, Q: AsRef<Path>>(&self, input: P, output: Q) -> Result<ExportSummary> {
        let cloud = self.read(&input)?;
        AsciiPlyWriter::write_file(&output, &cloud)?;

        info!("Exported {} map points", cloud.len());
        Ok(ExportSummary {
            output: output.as_ref().to_path_buf(),
            vertex_count: cloud.len(),
        })
    }
}

impl Default for PointCloudExport {
    fn default() -> Self {
        Self::new()
    }
}

/// Options for exporting camera trajectories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryExport {
    pub table: TableOptions,
    pub layout: ColumnLayout,
    /// Color given to every trajectory vertex
    pub color: Rgb,
}

impl TrajectoryExport {
    pub fn new() -> Self {
        Self {
            table: TableOptions::csv(),
            layout: ColumnLayout::TRAJECTORY,
            color: Rgb::LIGHT_GREEN,
        }
    }

    pub fn with_table(mut self, table: TableOptions) -> Self {
        self.table = table;
        self
    }

    pub fn with_layout(mut self, layout: ColumnLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    /// Parse the input into colored camera positions without writing anything
    pub fn read<P: AsRef<Path>>(&self, input: P) -> Result<PointCloud<ColoredPoint3d>> {
        let table = NumericTableReader::read(input, &self.table)?;
        table
            .iter()
            .map(|row| {
                self.layout
                    .extract(row)
                    .map(|position| ColoredPoint3d::new(position, self.color))
            })
            .collect()
    }

    #[tracing::instrument(skip_all, fields(input = %input.as_ref().display(), output = %output.as_ref().display()))]
    pub fn export<P: AsRef<Path>, Q: AsRef<Path>>(&self, input: P, output: Q) -> Result<ExportSummary> {
        let cloud = self.read(&input)?;
        AsciiPlyWriter::write_file(&output, &cloud)?;

        info!("Exported {} trajectory poses", cloud.len());
        Ok(ExportSummary {
            output: output.as_ref().to_path_buf(),
            vertex_count: cloud.len(),
        })
    }
}

impl Default for TrajectoryExport {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a successful export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub output: PathBuf,
    pub vertex_count: usize,
}

/// Convert a map point CSV (`pos_x, pos_y, pos_z, ...`) into a PLY file
pub fn export_point_cloud<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<ExportSummary> {
    PointCloudExport::new().export(input, output)
}

/// Convert a camera trajectory CSV into a light green PLY point set
pub fn export_trajectory<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<ExportSummary> {
    TrajectoryExport::new().export(input, output)
}
