//! I/O operations for SLAM outputs
//!
//! This crate reads the numeric CSV tables produced by ORB-SLAM style
//! pipelines (map points and camera trajectories) and writes them as ASCII
//! PLY point sets that external viewers can open. It also walks whole demo
//! session directories and reads PLY files back for inspection.

pub mod table;
pub mod layout;
pub mod ply;
pub mod export;
pub mod session;

pub use table::{Delimiter, NumericRow, NumericTable, NumericTableReader, TableOptions};
pub use layout::ColumnLayout;
pub use ply::{AsciiPlyWriter, PlyFormat, PlyProperty, PlyReader, PlyScalar, PlyVertex, PlyVertices};
pub use export::{export_point_cloud, export_trajectory, ExportSummary, PointCloudExport, TrajectoryExport};
pub use session::{
    convert_session, plan_session, ConversionJob, ExportKind, OutputPlacement, SessionOptions,
    SessionPlan, SessionReport,
};
