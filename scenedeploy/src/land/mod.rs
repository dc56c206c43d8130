//! Land selections and their expansion to pointer ids.
//!
//! A user owns land either as single parcels or as estates grouping several
//! parcels. Deployment lookups work on parcel pointers, so estates are
//! expanded through an [`EstateIndex`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::coord::coords_to_id;

/// A piece of land the user can deploy to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LandSelection {
    Parcel { x: i32, y: i32 },
    Estate { id: String },
}

/// Estate id → member parcel ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EstateIndex {
    estates: HashMap<String, Vec<String>>,
}

impl EstateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the member parcels of an estate, replacing any previous entry.
    pub fn insert(&mut self, estate_id: impl Into<String>, coords: Vec<String>) {
        self.estates.insert(estate_id.into(), coords);
    }

    /// Member parcels of an estate, if known.
    pub fn coords(&self, estate_id: &str) -> Option<&[String]> {
        self.estates.get(estate_id).map(Vec::as_slice)
    }
}

/// Expands selections to parcel ids, in selection order.
///
/// Unknown estates contribute nothing.
pub fn coords_for_lands(lands: &[LandSelection], index: &EstateIndex) -> Vec<String> {
    let mut coords = Vec::new();
    for land in lands {
        match land {
            LandSelection::Parcel { x, y } => coords.push(coords_to_id(*x, *y)),
            LandSelection::Estate { id } => {
                if let Some(members) = index.coords(id) {
                    coords.extend(members.iter().cloned());
                }
            }
        }
    }
    coords
}
