//! Parcel coordinate module
//!
//! Provides the `x,y` id encoding used as content network pointers and the
//! footprint calculation that turns a project layout and a placement into
//! the list of parcels a scene occupies.

mod types;

pub use types::{Coord, CoordError, Layout, Placement, Rotation};

/// Encodes a parcel position as a pointer id.
///
/// # Example
///
/// ```
/// assert_eq!(scenedeploy::coord::coords_to_id(-3, 12), "-3,12");
/// ```
#[inline]
pub fn coords_to_id(x: i32, y: i32) -> String {
    format!("{},{}", x, y)
}

/// Decodes a pointer id of the form `x,y`.
///
/// Surrounding whitespace around either component is tolerated.
pub fn id_to_coords(id: &str) -> Result<Coord, CoordError> {
    let (x, y) = id
        .split_once(',')
        .ok_or_else(|| CoordError::InvalidId(id.to_string()))?;

    let x = x
        .trim()
        .parse::<i32>()
        .map_err(|_| CoordError::InvalidId(id.to_string()))?;
    let y = y
        .trim()
        .parse::<i32>()
        .map_err(|_| CoordError::InvalidId(id.to_string()))?;

    Ok(Coord { x, y })
}

/// Largest footprint a single layout may cover (the full 301 x 301 grid).
pub const MAX_LAYOUT_PARCELS: u64 = 301 * 301;

/// Computes the parcels covered by a layout placed at `placement`.
///
/// The placement point is the base parcel. Parcels are produced row-major
/// from the base, with rows and columns swapped for east and west rotations.
/// Fails when the footprint is larger than [`MAX_LAYOUT_PARCELS`] or would
/// leave the `i32` coordinate range.
pub fn parcels_for_layout(
    placement: &Placement,
    layout: &Layout,
) -> Result<Vec<Coord>, CoordError> {
    let (cols, rows) = if placement.rotation.is_transposed() {
        (layout.rows, layout.cols)
    } else {
        (layout.cols, layout.rows)
    };

    let base = placement.point;
    let out_of_range = || CoordError::LayoutOutOfRange {
        base,
        rows: layout.rows,
        cols: layout.cols,
    };

    let count = u64::from(rows) * u64::from(cols);
    if count == 0 {
        return Ok(Vec::new());
    }
    if count > MAX_LAYOUT_PARCELS {
        return Err(out_of_range());
    }

    // Both sides are at most MAX_LAYOUT_PARCELS here, so they fit in i32.
    let (cols, rows) = (cols as i32, rows as i32);
    base.x.checked_add(cols - 1).ok_or_else(out_of_range)?;
    base.y.checked_add(rows - 1).ok_or_else(out_of_range)?;

    let mut parcels = Vec::with_capacity(count as usize);
    for dy in 0..rows {
        for dx in 0..cols {
            parcels.push(Coord::new(base.x + dx, base.y + dy));
        }
    }
    Ok(parcels)
}
