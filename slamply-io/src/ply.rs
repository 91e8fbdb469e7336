//! PLY format support
//!
//! Writing is ASCII only and done by hand so the header text and the `%f`
//! style number formatting stay byte-exact. Reading goes through `ply-rs` and
//! accepts any encoding, which makes it a useful independent check on what
//! the writer produced.

use slamply_core::{ColoredPoint3d, Error, Point3d, PointCloud, Result, Rgb};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::Builder;
use tracing::debug;

use ply_rs::{
    parser::Parser,
    ply::{DefaultElement, Encoding, Property},
};

/// Scalar types the writer can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyScalar {
    Float,
    UChar,
}

impl PlyScalar {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlyScalar::Float => "float",
            PlyScalar::UChar => "uchar",
        }
    }
}

/// A declared vertex property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlyProperty {
    pub name: &'static str,
    pub scalar: PlyScalar,
}

impl PlyProperty {
    pub const fn new(name: &'static str, scalar: PlyScalar) -> Self {
        Self { name, scalar }
    }
}

const XYZ: [PlyProperty; 3] = [
    PlyProperty::new("x", PlyScalar::Float),
    PlyProperty::new("y", PlyScalar::Float),
    PlyProperty::new("z", PlyScalar::Float),
];

const XYZ_RGB: [PlyProperty; 6] = [
    XYZ[0],
    XYZ[1],
    XYZ[2],
    PlyProperty::new("red", PlyScalar::UChar),
    PlyProperty::new("green", PlyScalar::UChar),
    PlyProperty::new("blue", PlyScalar::UChar),
];

/// A vertex type that knows its PLY property list and ASCII row encoding
pub trait PlyVertex {
    /// Properties in the order `write_ascii_row` emits them
    fn properties() -> &'static [PlyProperty];

    /// Write one space separated row, without the trailing newline
    fn write_ascii_row<W: Write>(&self, writer: &mut W) -> std::io::Result<()>;
}

impl PlyVertex for Point3d {
    fn properties() -> &'static [PlyProperty] {
        &XYZ
    }

    fn write_ascii_row<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        write_scalar(writer, self.x)?;
        writer.write_all(b" ")?;
        write_scalar(writer, self.y)?;
        writer.write_all(b" ")?;
        write_scalar(writer, self.z)
    }
}

/// Six decimal places like C `%f`, which also spells non-finite values in
/// lowercase (`nan`, `inf`, `-inf`).
fn write_scalar<W: Write>(writer: &mut W, value: f64) -> std::io::Result<()> {
    if value.is_nan() {
        writer.write_all(b"nan")
    } else if value.is_infinite() {
        writer.write_all(if value > 0.0 { b"inf" } else { b"-inf" })
    } else {
        write!(writer, "{:.6}", value)
    }
}

impl PlyVertex for ColoredPoint3d {
    fn properties() -> &'static [PlyProperty] {
        &XYZ_RGB
    }

    fn write_ascii_row<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        self.position.write_ascii_row(writer)?;
        write!(writer, " {} {} {}", self.color.r, self.color.g, self.color.b)
    }
}

/// ASCII PLY writer
pub struct AsciiPlyWriter;

impl AsciiPlyWriter {
    /// Write the header block. `vertex_count` must match the rows that follow.
    pub fn write_header<T: PlyVertex, W: Write>(writer: &mut W, vertex_count: usize) -> Result<()> {
        writeln!(writer, "ply")?;
        writeln!(writer, "format ascii 1.0")?;
        writeln!(writer, "element vertex {}", vertex_count)?;
        for property in T::properties() {
            writeln!(writer, "property {} {}", property.scalar.as_str(), property.name)?;
        }
        writeln!(writer, "end_header")?;
        Ok(())
    }

    /// Write a whole cloud; the declared count is taken from the cloud itself
    pub fn write<T: PlyVertex, W: Write>(writer: &mut W, cloud: &PointCloud<T>) -> Result<()> {
        Self::write_header::<T, W>(writer, cloud.len())?;
        for vertex in cloud {
            vertex.write_ascii_row(writer)?;
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Write a cloud to `path`, replacing any existing file only once the
    /// complete output has been written.
    ///
    /// A new file gets the usual `0o666` less umask on Unix; an existing
    /// file keeps its permissions.
    pub fn write_file<T: PlyVertex, P: AsRef<Path>>(path: P, cloud: &PointCloud<T>) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        #[cfg_attr(not(unix), allow(unused_mut))]
        let mut builder = Builder::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(fs::Permissions::from_mode(0o666));
        }
        let mut temp = builder.tempfile_in(dir)?;
        if let Ok(existing) = fs::metadata(path) {
            temp.as_file().set_permissions(existing.permissions())?;
        }
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            Self::write(&mut writer, cloud)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        debug!("Wrote {} vertices to {}", cloud.len(), path.display());
        Ok(())
    }
}

/// Encoding of a PLY file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyFormat {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

impl From<Encoding> for PlyFormat {
    fn from(encoding: Encoding) -> Self {
        match encoding {
            Encoding::Ascii => PlyFormat::Ascii,
            Encoding::BinaryLittleEndian => PlyFormat::BinaryLittleEndian,
            Encoding::BinaryBigEndian => PlyFormat::BinaryBigEndian,
        }
    }
}

/// Vertex data read back from a PLY file
#[derive(Debug, Clone)]
pub struct PlyVertices {
    pub format: PlyFormat,
    /// Vertex count declared in the header
    pub declared_count: usize,
    /// Vertex property names in header order
    pub property_names: Vec<String>,
    pub positions: PointCloud<Point3d>,
    /// Present when every vertex carries red, green and blue
    pub colors: Option<Vec<Rgb>>,
}

impl PlyVertices {
    /// Distinct colors in order of first appearance
    pub fn distinct_colors(&self) -> Vec<Rgb> {
        let mut distinct = Vec::new();
        for color in self.colors.iter().flatten() {
            if !distinct.contains(color) {
                distinct.push(*color);
            }
        }
        distinct
    }
}

pub struct PlyReader;

impl PlyReader {
    /// Read the vertex element of a PLY file
    pub fn read_vertices<P: AsRef<Path>>(path: P) -> Result<PlyVertices> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let parser = Parser::<DefaultElement>::new();
        let ply = parser
            .read_ply(&mut reader)
            .map_err(|e| Error::InvalidData(format!("PLY parsing error: {}", e)))?;

        let vertex_def = ply
            .header
            .elements
            .get("vertex")
            .ok_or_else(|| Error::InvalidData("PLY file has no vertex element".to_string()))?;
        let property_names: Vec<String> = vertex_def.properties.keys().cloned().collect();

        let empty = Vec::new();
        let vertices = ply.payload.get("vertex").unwrap_or(&empty);

        let mut positions = PointCloud::with_capacity(vertices.len());
        let mut colors = Vec::with_capacity(vertices.len());
        let mut has_colors = true;

        for (i, vertex) in vertices.iter().enumerate() {
            let coord = |name: &str| {
                extract_scalar(vertex, name).ok_or_else(|| {
                    Error::InvalidData(format!("Property '{}' missing at vertex {}", name, i))
                })
            };
            positions.push(Point3d::new(coord("x")?, coord("y")?, coord("z")?));

            if has_colors {
                match (
                    extract_channel(vertex, "red"),
                    extract_channel(vertex, "green"),
                    extract_channel(vertex, "blue"),
                ) {
                    (Some(r), Some(g), Some(b)) => colors.push(Rgb::new(r, g, b)),
                    _ => has_colors = false,
                }
            }
        }

        Ok(PlyVertices {
            format: ply.header.encoding.into(),
            declared_count: vertex_def.count,
            property_names,
            positions,
            colors: if has_colors && !colors.is_empty() {
                Some(colors)
            } else {
                None
            },
        })
    }

    /// Read only the vertex positions
    pub fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3d>> {
        Ok(Self::read_vertices(path)?.positions)
    }
}

/// Extract a scalar property as f64 from a PLY element
fn extract_scalar(element: &DefaultElement, name: &str) -> Option<f64> {
    match element.get(name)? {
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        _ => None,
    }
}

/// Extract a color channel, clamping wider types into `0..=255`
fn extract_channel(element: &DefaultElement, name: &str) -> Option<u8> {
    match element.get(name)? {
        Property::UChar(v) => Some(*v),
        _ => extract_scalar(element, name).map(|v| v.clamp(0.0, 255.0) as u8),
    }
}
