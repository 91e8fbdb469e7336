//! Core data structures and traits for slamply
//!
//! This crate provides the fundamental types shared by the CSV readers and
//! PLY writers: positions, vertex colors, point clouds and the error type.

pub mod point;
pub mod point_cloud;
pub mod traits;
pub mod error;

pub use point::*;
pub use point_cloud::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};
