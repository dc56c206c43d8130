//! Migrate command - bring stored documents up to the current schema.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use scenedeploy::migration::{
    project_ladder, run_migrations, scene_ladder, to_project_cloud_schema,
};
use scenedeploy::project::Project;
use scenedeploy::scene::Scene;

use super::common::{print_ok, read_json, write_json};
use crate::error::CliError;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum DocumentKind {
    Project,
    Scene,
}

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Kind of document
    #[arg(long, value_enum)]
    pub kind: DocumentKind,

    /// Document to migrate
    pub input: PathBuf,

    /// Output file (defaults to rewriting the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Convert a migrated project to the cloud storage shape
    #[arg(long)]
    pub cloud: bool,
}

pub fn run(args: MigrateArgs) -> Result<(), CliError> {
    let output = args.output.clone().unwrap_or_else(|| args.input.clone());

    let version = match args.kind {
        DocumentKind::Project => {
            let project: Project = read_json(&args.input)?;
            let mut project = run_migrations(project, &project_ladder())?;
            if args.cloud {
                project = to_project_cloud_schema(&project)?;
            }
            write_json(&output, &project)?;
            project.version
        }
        DocumentKind::Scene => {
            if args.cloud {
                return Err(CliError::Config(
                    "--cloud only applies to project documents".to_string(),
                ));
            }
            let scene: Scene = read_json(&args.input)?;
            let scene = run_migrations(scene, &scene_ladder())?;
            write_json(&output, &scene)?;
            scene.version
        }
    };

    print_ok(format!(
        "Migrated {} to version {}",
        output.display(),
        version
    ));
    Ok(())
}
