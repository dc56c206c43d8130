//! Unique entity name assignment.
//!
//! Every entity gets a human-readable name derived from its most identifying
//! shape component. When the base name is already taken, an increasing
//! numeric suffix is appended (`tree`, `tree2`, `tree3`, ...).
//!
//! Assignment is order-sensitive: callers must process entities in document
//! order and register each chosen name before naming the next entity.

use std::collections::HashSet;

use super::{Asset, ComponentDefinition, ComponentType, OrderedMap};

/// Base name used when no shape component identifies the entity.
pub const DEFAULT_ENTITY_NAME: &str = "entity";

/// Base name used for entities carrying an NFT shape.
pub const NFT_ENTITY_NAME: &str = "nft";

/// File stem of a GLTF shape's model source (`models/Tree_01.glb` → `Tree_01`).
///
/// Returns `None` when the component has no `src` or the stem is empty.
pub fn gltf_shape_name(component: &ComponentDefinition) -> Option<String> {
    let src = component.data_str("src")?;
    let file = src.rsplit('/').next().unwrap_or(src);
    let stem = file.split('.').next().unwrap_or(file);
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

/// Turns free-form text into a camel-cased identifier.
///
/// The result starts with a letter and contains only ASCII letters and
/// digits. Returns `None` when fewer than two such characters remain.
pub fn to_identifier(raw: &str) -> Option<String> {
    let words: Vec<&str> = raw
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let mut out = String::with_capacity(raw.len());
    for word in words {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if out.is_empty() {
                out.push(first.to_ascii_lowercase());
            } else {
                out.push(first.to_ascii_uppercase());
            }
            out.extend(chars);
        }
    }

    let trimmed = out.trim_start_matches(|c: char| c.is_ascii_digit());
    let mut chars = trimmed.chars();
    let first = chars.next()?;
    let ident: String = std::iter::once(first.to_ascii_lowercase())
        .chain(chars)
        .collect();

    if ident.len() < 2 {
        None
    } else {
        Some(ident)
    }
}

/// Appends the first free numeric suffix to `raw_name`.
fn first_free(raw_name: &str, taken: &HashSet<String>) -> String {
    let mut attempts = 1u32;
    let mut name = raw_name.to_string();
    while taken.contains(&name) {
        attempts += 1;
        name = format!("{}{}", raw_name, attempts);
    }
    name
}

/// Assigns a name using the current naming policy.
///
/// GLTF shapes are named after their catalog asset (falling back to the
/// model file stem), sanitized into an identifier. The last identifying
/// shape in `components` wins.
pub fn unique_name(
    components: &[&ComponentDefinition],
    taken: &HashSet<String>,
    assets: Option<&OrderedMap<Asset>>,
) -> String {
    let mut raw_name = DEFAULT_ENTITY_NAME.to_string();

    for component in components {
        match component.kind {
            ComponentType::GltfShape => {
                let from_asset = component
                    .data_str("assetId")
                    .and_then(|id| assets.and_then(|a| a.get(id)))
                    .map(|asset| asset.name.clone());
                let candidate = from_asset
                    .or_else(|| gltf_shape_name(component))
                    .and_then(|n| to_identifier(&n));
                if let Some(name) = candidate {
                    raw_name = name;
                }
            }
            ComponentType::NftShape => raw_name = NFT_ENTITY_NAME.to_string(),
            _ => {}
        }
    }

    first_free(&raw_name, taken)
}

/// Assigns a name using the first-generation naming policy.
///
/// GLTF shapes are named after the raw model file stem, without any
/// sanitizing; shapes without a usable source keep the previous candidate.
pub fn unique_name_legacy(components: &[&ComponentDefinition], taken: &HashSet<String>) -> String {
    let mut raw_name = DEFAULT_ENTITY_NAME.to_string();

    for component in components {
        match component.kind {
            ComponentType::GltfShape => {
                if let Some(name) = gltf_shape_name(component) {
                    raw_name = name;
                }
            }
            ComponentType::NftShape => raw_name = NFT_ENTITY_NAME.to_string(),
            _ => {}
        }
    }

    first_free(&raw_name, taken)
}
