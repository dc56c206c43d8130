//! Coordinate types for parcels, placements and layouts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while parsing coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordError {
    /// Coordinate id is not of the form `x,y`.
    #[error("invalid coordinate id: {0}")]
    InvalidId(String),

    /// Rotation name is not one of north/east/south/west.
    #[error("invalid rotation: {0}")]
    InvalidRotation(String),

    /// A layout placed at `base` does not fit the coordinate range.
    #[error("layout {rows}x{cols} at {base} is out of range")]
    LayoutOutOfRange { base: Coord, rows: u32, cols: u32 },
}

/// A parcel position on the land grid.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    /// Create a new coordinate.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Encode as the `x,y` id used for content network pointers.
    pub fn to_id(&self) -> String {
        super::coords_to_id(self.x, self.y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for Coord {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        super::id_to_coords(s)
    }
}

/// Facing of a placed scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    #[default]
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Lowercase name as stored in scene metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::North => "north",
            Rotation::East => "east",
            Rotation::South => "south",
            Rotation::West => "west",
        }
    }

    /// Whether the layout footprint is transposed under this rotation.
    pub fn is_transposed(&self) -> bool {
        matches!(self, Rotation::East | Rotation::West)
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rotation {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "north" => Ok(Rotation::North),
            "east" => Ok(Rotation::East),
            "south" => Ok(Rotation::South),
            "west" => Ok(Rotation::West),
            _ => Err(CoordError::InvalidRotation(s.to_string())),
        }
    }
}

/// Target location of a deployment: a parcel plus a rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Placement {
    pub point: Coord,
    pub rotation: Rotation,
}

impl Placement {
    /// Create a new placement.
    pub fn new(point: Coord, rotation: Rotation) -> Self {
        Self { point, rotation }
    }

    /// Placement used for world deployments, which have no land position.
    pub fn origin() -> Self {
        Self::default()
    }
}

/// Grid dimensions of a project, in parcels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layout {
    pub rows: u32,
    pub cols: u32,
}

impl Layout {
    /// Create a new layout.
    pub fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// Number of parcels covered.
    pub fn parcel_count(&self) -> usize {
        (self.rows as usize) * (self.cols as usize)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self { rows: 1, cols: 1 }
    }
}
