//! Deployment records.

use serde::{Deserialize, Serialize};

use crate::coord::{Layout, Placement};

/// A scene published at a placement (or in a world).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    /// Entity id on the content network.
    pub id: String,
    pub placement: Placement,
    pub owner: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub layout: Option<Layout>,
    pub name: String,
    pub thumbnail: Option<String>,
    pub project_id: Option<String>,
    pub base: String,
    pub parcels: Vec<String>,
    /// World name for world deployments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world: Option<String>,
}

impl Deployment {
    /// Key under which this deployment supersedes others.
    ///
    /// Land deployments are keyed by their base parcel, world deployments
    /// by world name.
    pub fn placement_key(&self) -> &str {
        self.world.as_deref().unwrap_or(&self.base)
    }

    /// Whether the deployment covers parcel `coord_id`.
    pub fn covers(&self, coord_id: &str) -> bool {
        self.parcels.iter().any(|p| p == coord_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{Coord, Rotation};

    fn deployment(world: Option<&str>) -> Deployment {
        Deployment {
            id: "e1".into(),
            placement: Placement::new(Coord::new(1, 1), Rotation::North),
            owner: "0xabc".into(),
            timestamp: 1,
            layout: Some(Layout::new(1, 2)),
            name: "Plaza".into(),
            thumbnail: None,
            project_id: Some("p1".into()),
            base: "1,1".into(),
            parcels: vec!["1,1".into(), "2,1".into()],
            world: world.map(String::from),
        }
    }

    #[test]
    fn test_placement_key() {
        assert_eq!(deployment(None).placement_key(), "1,1");
        assert_eq!(deployment(Some("me.dcl.eth")).placement_key(), "me.dcl.eth");
    }

    #[test]
    fn test_covers() {
        let d = deployment(None);
        assert!(d.covers("2,1"));
        assert!(!d.covers("3,1"));
    }

    #[test]
    fn test_serialize_shape() {
        let value = serde_json::to_value(deployment(None)).unwrap();
        assert_eq!(value["projectId"], "p1");
        assert_eq!(value["placement"]["rotation"], "north");
        assert!(value.get("world").is_none());
    }
}
