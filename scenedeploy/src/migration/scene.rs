//! Scene schema transforms.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Value};

use super::{MigrationError, MigrationLadder, MigrationResult};
use crate::scene::{unique_name, unique_name_legacy, ComponentType, OrderedMap, Scene};

/// Names that start with a digit.
fn leading_digit_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d").unwrap())
}

/// A letter followed by at least one letter or digit.
fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z\d]+$").unwrap())
}

/// The built-in scene ladder, up to version 8.
pub fn scene_ladder() -> MigrationLadder<Scene> {
    MigrationLadder::new()
        .step(2, add_scale)
        .step_mut(3, add_entity_name)
        .step_mut(4, add_assets)
        .step_mut(5, sanitize_entity_name)
        .step_mut(6, remove_script_src)
        .step_mut(7, sanitize_entity_name2)
        .step_mut(8, dedupe_entity_name)
}

/// Gives every Transform without a scale a unit scale.
///
/// Fails if a Transform's data is not an object.
pub fn add_scale(mut scene: Scene) -> MigrationResult<Scene> {
    for component in scene.components.values_mut() {
        if component.kind != ComponentType::Transform {
            continue;
        }
        let Value::Object(data) = &mut component.data else {
            return Err(MigrationError::step(format!(
                "transform {} has no data object",
                component.id
            )));
        };
        let has_scale = data
            .get("scale")
            .map(|s| !s.is_null() && s != &Value::Bool(false))
            .unwrap_or(false);
        if !has_scale {
            data.insert("scale".to_string(), json!({ "x": 1, "y": 1, "z": 1 }));
        }
    }
    Ok(scene)
}

/// Renames entities for which `needs_name` holds, in document order.
///
/// The taken set only ever contains names assigned by this pass.
fn rename_entities<F>(scene: &mut Scene, legacy: bool, needs_name: F)
where
    F: Fn(&str) -> bool,
{
    let mut taken = HashSet::new();
    let mut assigned = Vec::new();

    for (entity_id, entity) in scene.entities.iter() {
        if !needs_name(&entity.name) {
            continue;
        }
        let components = scene.entity_components(entity);
        let name = if legacy {
            unique_name_legacy(&components, &taken)
        } else {
            unique_name(&components, &taken, scene.assets.as_ref())
        };
        taken.insert(name.clone());
        assigned.push((entity_id.to_string(), name));
    }

    for (entity_id, name) in assigned {
        if let Some(entity) = scene.entities.get_mut(&entity_id) {
            entity.name = name;
        }
    }
}

/// Names every entity with the first-generation naming policy.
pub fn add_entity_name(scene: &mut Scene) {
    rename_entities(scene, true, |_| true);
}

/// Ensures an asset catalog exists.
pub fn add_assets(scene: &mut Scene) {
    if scene.assets.is_none() {
        scene.assets = Some(OrderedMap::new());
    }
}

/// Renames entities whose name starts with a digit.
pub fn sanitize_entity_name(scene: &mut Scene) {
    rename_entities(scene, false, |name| leading_digit_pattern().is_match(name));
}

/// Drops the `src` field from every Script component.
pub fn remove_script_src(scene: &mut Scene) {
    for component in scene.components.values_mut() {
        if component.kind == ComponentType::Script {
            if let Value::Object(data) = &mut component.data {
                data.remove("src");
            }
        }
    }
}

/// Renames entities whose name is not a plain identifier.
pub fn sanitize_entity_name2(scene: &mut Scene) {
    rename_entities(scene, false, |name| !identifier_pattern().is_match(name));
}

/// Renames every entity with the current naming policy.
pub fn dedupe_entity_name(scene: &mut Scene) {
    rename_entities(scene, false, |_| true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::run_migrations;
    use crate::scene::{Asset, ComponentDefinition, SceneEntity};

    fn add_component(scene: &mut Scene, id: &str, kind: ComponentType, data: Value) {
        scene
            .components
            .insert(id, ComponentDefinition::new(id, kind, data));
    }

    fn add_entity(scene: &mut Scene, id: &str, name: &str, components: &[&str]) {
        scene.entities.insert(
            id,
            SceneEntity::new(id, name, components.iter().map(|c| c.to_string()).collect()),
        );
    }

    fn names(scene: &Scene) -> Vec<String> {
        scene.entities.values().map(|e| e.name.clone()).collect()
    }

    #[test]
    fn test_add_scale_only_when_missing() {
        let mut scene = Scene::new("s");
        add_component(&mut scene, "t1", ComponentType::Transform, json!({"position": {}}));
        add_component(
            &mut scene,
            "t2",
            ComponentType::Transform,
            json!({"scale": {"x": 2, "y": 2, "z": 2}}),
        );

        let scene = add_scale(scene).unwrap();
        assert_eq!(
            scene.components.get("t1").unwrap().data["scale"],
            json!({"x": 1, "y": 1, "z": 1})
        );
        assert_eq!(scene.components.get("t2").unwrap().data["scale"]["x"], 2);
    }

    #[test]
    fn test_add_scale_rejects_missing_data() {
        let mut scene = Scene::new("s");
        add_component(&mut scene, "t1", ComponentType::Transform, Value::Null);
        assert!(add_scale(scene).is_err());
    }

    #[test]
    fn test_add_entity_name_legacy() {
        let mut scene = Scene::new("s");
        add_component(&mut scene, "g", ComponentType::GltfShape, json!({"src": "models/Tree_01.glb"}));
        add_component(&mut scene, "n", ComponentType::NftShape, json!({}));
        add_entity(&mut scene, "e1", "", &["g"]);
        add_entity(&mut scene, "e2", "", &["g"]);
        add_entity(&mut scene, "e3", "", &["n"]);
        add_entity(&mut scene, "e4", "", &[]);

        add_entity_name(&mut scene);
        assert_eq!(names(&scene), vec!["Tree_01", "Tree_012", "nft", "entity"]);
    }

    #[test]
    fn test_add_assets_keeps_existing() {
        let mut scene = Scene::new("s");
        add_assets(&mut scene);
        assert!(scene.assets.as_ref().unwrap().is_empty());

        let mut catalog = OrderedMap::new();
        catalog.insert(
            "a",
            Asset {
                id: "a".into(),
                name: "A".into(),
                model: "a.glb".into(),
                contents: Default::default(),
                extra: Default::default(),
            },
        );
        scene.assets = Some(catalog);
        add_assets(&mut scene);
        assert_eq!(scene.assets.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_sanitize_entity_name_only_leading_digits() {
        let mut scene = Scene::new("s");
        add_component(&mut scene, "g", ComponentType::GltfShape, json!({"src": "models/Bench.glb"}));
        add_entity(&mut scene, "e1", "1bench", &["g"]);
        add_entity(&mut scene, "e2", "bench", &["g"]);
        add_entity(&mut scene, "e3", "2bench", &["g"]);

        sanitize_entity_name(&mut scene);
        // The untouched "bench" is not seeded into the taken set.
        assert_eq!(names(&scene), vec!["bench", "bench", "bench2"]);
    }

    #[test]
    fn test_remove_script_src() {
        let mut scene = Scene::new("s");
        add_component(&mut scene, "s1", ComponentType::Script, json!({"src": "game.js", "assetId": "x"}));
        add_component(&mut scene, "g", ComponentType::GltfShape, json!({"src": "a.glb"}));

        remove_script_src(&mut scene);
        assert!(scene.components.get("s1").unwrap().data.get("src").is_none());
        assert_eq!(scene.components.get("s1").unwrap().data["assetId"], "x");
        assert_eq!(scene.components.get("g").unwrap().data["src"], "a.glb");
    }

    #[test]
    fn test_sanitize_entity_name2() {
        let mut scene = Scene::new("s");
        add_component(&mut scene, "n", ComponentType::NftShape, json!({}));
        add_entity(&mut scene, "e1", "good1", &["n"]);
        add_entity(&mut scene, "e2", "bad name", &["n"]);
        add_entity(&mut scene, "e3", "x", &["n"]);

        sanitize_entity_name2(&mut scene);
        assert_eq!(names(&scene), vec!["good1", "nft", "nft2"]);
    }

    #[test]
    fn test_dedupe_entity_name_renames_all() {
        let mut scene = Scene::new("s");
        add_component(&mut scene, "n", ComponentType::NftShape, json!({}));
        add_entity(&mut scene, "e1", "custom", &["n"]);
        add_entity(&mut scene, "e2", "custom", &[]);

        dedupe_entity_name(&mut scene);
        assert_eq!(names(&scene), vec!["nft", "entity"]);
    }

    #[test]
    fn test_full_ladder_from_v1() {
        let mut scene = Scene::new("s");
        add_component(&mut scene, "t", ComponentType::Transform, json!({}));
        add_component(&mut scene, "g", ComponentType::GltfShape, json!({"src": "models/3D Rock.glb"}));
        add_component(&mut scene, "js", ComponentType::Script, json!({"src": "x.js"}));
        add_entity(&mut scene, "e1", "", &["t", "g"]);
        add_entity(&mut scene, "e2", "", &["t", "g"]);
        scene.version = 1;

        let out = run_migrations(scene, &scene_ladder()).unwrap();
        assert_eq!(out.version, 8);
        assert!(out.assets.is_some());
        assert_eq!(out.components.get("t").unwrap().data["scale"]["y"], 1);
        assert!(out.components.get("js").unwrap().data.get("src").is_none());
        assert_eq!(names(&out), vec!["dRock", "dRock2"]);
        for name in names(&out) {
            assert!(identifier_pattern().is_match(&name));
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_scene_ladder_idempotent(
                start in 0u32..9,
                kinds in proptest::collection::vec(0u8..4, 0..12)
            ) {
                let mut scene = Scene::new("s");
                scene.version = start;
                add_component(&mut scene, "t", ComponentType::Transform, json!({}));
                add_component(&mut scene, "g", ComponentType::GltfShape, json!({"src": "models/Pine Tree.glb"}));
                add_component(&mut scene, "n", ComponentType::NftShape, json!({}));
                for (i, kind) in kinds.iter().enumerate() {
                    let components: &[&str] = match kind {
                        0 => &["t"],
                        1 => &["t", "g"],
                        2 => &["n"],
                        _ => &[],
                    };
                    add_entity(&mut scene, &format!("e{}", i), "", components);
                }

                let ladder = scene_ladder();
                let once = run_migrations(scene, &ladder)?;
                let twice = run_migrations(once.clone(), &ladder)?;
                prop_assert_eq!(once, twice);
            }
        }
    }
}
