//! scenedeploy - Builder scene packaging and publishing
//!
//! This library turns builder projects into content-addressed scene
//! packages and publishes them to land parcels, named worlds, or the public
//! scene pool. It covers:
//!
//! - document migrations for stored projects and scenes ([`migration`])
//! - scene packaging and content hashing ([`packager`], [`content`])
//! - signed deployment flows and the deployment index ([`deployment`])
//!
//! Remote services sit behind the traits in [`client`], [`identity`],
//! [`media`] and [`store`], so flows can run against any backend.

pub mod client;
pub mod config;
pub mod content;
pub mod coord;
pub mod deployment;
pub mod identity;
pub mod land;
pub mod logging;
pub mod media;
pub mod migration;
pub mod packager;
pub mod progress;
pub mod project;
pub mod scene;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;
