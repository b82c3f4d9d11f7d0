//! Binary path file codec.
//!
//! The on-disk format is little-endian and minimal: a `u32` signature,
//! an `i16` interpolation mode tag, an `i32` point count, then that many
//! `f32` coordinate triples. Positions are stored single-precision; decoding
//! widens them to `f64`.

use std::path::Path;

use curvekit_core::{CurveError, Result, Validate};
use curvekit_math::Point3;
use curvekit_spline::{ControlPointSet, CurveEvaluator, InterpolationMode};
use serde::{Deserialize, Serialize};

/// File signature at the head of every path file.
pub const PATH_MAGIC: u32 = 0x0235_0818;

/// Bytes per stored point: three `f32` coordinates.
const POINT_SIZE: usize = 12;

/// A decoded path file: an interpolation mode and the control positions.
///
/// Only geometry crosses the wire. Rotations, custom values, and tensions
/// always decode to their neutral defaults, and closure/accuracy are chosen
/// by the caller when turning the data into an evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathData {
    pub mode: InterpolationMode,
    pub positions: Vec<Point3>,
}

impl PathData {
    pub fn new(mode: InterpolationMode, positions: Vec<Point3>) -> Self {
        Self { mode, positions }
    }

    /// Turn the decoded positions into a control point set.
    pub fn to_control_points(&self, closed: bool, accuracy: usize) -> ControlPointSet {
        ControlPointSet::from_positions(&self.positions, closed, accuracy)
    }

    /// Build an evaluator directly from the decoded data.
    pub fn to_evaluator(&self, closed: bool, accuracy: usize) -> CurveEvaluator {
        CurveEvaluator::new(self.to_control_points(closed, accuracy), self.mode)
    }
}

impl Validate for PathData {
    fn validate(&self) -> Result<()> {
        for (i, p) in self.positions.iter().enumerate() {
            if !p.is_finite() {
                return Err(CurveError::Format(format!(
                    "path point {i} is not finite: {p:?}"
                )));
            }
        }
        Ok(())
    }
}

/// Little-endian cursor over a byte buffer.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(CurveError::Format(format!(
                "truncated path data: needed {n} bytes at offset {}, {} left",
                self.pos,
                self.remaining()
            )));
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_i32(&mut self) -> Result<i32> {
        let b = self.take(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_i16(&mut self) -> Result<i16> {
        let b = self.take(2)?;
        Ok(i16::from_le_bytes([b[0], b[1]]))
    }

    fn read_f32(&mut self) -> Result<f32> {
        let b = self.take(4)?;
        Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

/// Decode a path from its binary representation.
pub fn decode(data: &[u8]) -> Result<PathData> {
    let mut reader = Reader::new(data);

    let magic = reader.read_u32()?;
    if magic != PATH_MAGIC {
        return Err(CurveError::Format(format!(
            "bad path signature {magic:#010x}, expected {PATH_MAGIC:#010x}"
        )));
    }

    let tag = reader.read_i16()?;
    let mode = InterpolationMode::from_i16(tag)
        .ok_or_else(|| CurveError::Format(format!("unknown interpolation mode tag {tag}")))?;

    let count = reader.read_i32()?;
    if count < 0 {
        return Err(CurveError::Format(format!("negative point count {count}")));
    }
    let count = count as usize;
    // Reject counts the buffer cannot possibly hold before allocating.
    if reader.remaining() < count * POINT_SIZE {
        return Err(CurveError::Format(format!(
            "point count {count} exceeds payload ({} bytes left)",
            reader.remaining()
        )));
    }

    let mut positions = Vec::with_capacity(count);
    for _ in 0..count {
        let x = reader.read_f32()? as f64;
        let y = reader.read_f32()? as f64;
        let z = reader.read_f32()? as f64;
        positions.push(Point3::new(x, y, z));
    }

    Ok(PathData { mode, positions })
}

/// Encode a path to its binary representation.
///
/// Point counts beyond `i32::MAX` cannot be represented in the format.
pub fn encode(path: &PathData) -> Result<Vec<u8>> {
    let count = i32::try_from(path.positions.len())
        .map_err(|_| CurveError::Format(format!("too many points: {}", path.positions.len())))?;

    let mut out = Vec::with_capacity(4 + 2 + 4 + path.positions.len() * POINT_SIZE);
    out.extend_from_slice(&PATH_MAGIC.to_le_bytes());
    out.extend_from_slice(&path.mode.as_i16().to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());
    for p in &path.positions {
        out.extend_from_slice(&(p.x as f32).to_le_bytes());
        out.extend_from_slice(&(p.y as f32).to_le_bytes());
        out.extend_from_slice(&(p.z as f32).to_le_bytes());
    }

    Ok(out)
}

/// Read and decode a path file.
pub fn read_path_file<P: AsRef<Path>>(path: P) -> Result<PathData> {
    let data = std::fs::read(path)?;
    decode(&data)
}

/// Encode and write a path file.
pub fn write_path_file<P: AsRef<Path>>(path: P, data: &PathData) -> Result<()> {
    let bytes = encode(data)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
