//! Deploy command - publish the workspace project.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;
use scenedeploy::config::ConfigFile;
use scenedeploy::coord::{Coord, Placement};
use scenedeploy::deployment::Deployment;

use super::common::{
    build_orchestrator, print_ok, progress_bar, spawn_file_renderer, RotationArg, Wiring,
    Workspace,
};
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct DeployArgs {
    /// Workspace directory holding project.json and scene.json
    #[arg(short, long, default_value = ".", global = true)]
    pub workspace: PathBuf,

    /// Author name written to the scene contact
    #[arg(long, global = true)]
    pub author: Option<String>,

    #[command(subcommand)]
    pub target: DeployTarget,
}

#[derive(Debug, Subcommand)]
pub enum DeployTarget {
    /// Record previews and submit the project to the public scene pool
    Pool {
        /// Pool submission options as a JSON object
        #[arg(long)]
        options: Option<String>,
    },

    /// Publish to land at a base parcel
    Land {
        #[arg(long, allow_hyphen_values = true)]
        x: i32,

        #[arg(long, allow_hyphen_values = true)]
        y: i32,

        #[arg(long, value_enum, default_value = "north")]
        rotation: RotationArg,

        /// Deployment this one replaces
        #[arg(long = "override")]
        override_id: Option<String>,
    },

    /// Publish to a named world
    World {
        /// World name (e.g. myname.dcl.eth)
        name: String,
    },
}

pub async fn run(args: DeployArgs, config: &ConfigFile) -> Result<(), CliError> {
    let workspace = Workspace::load(&args.workspace)?;
    let orchestrator = build_orchestrator(Wiring {
        config,
        workspace: Some(&workspace),
        author: args.author,
        capture: spawn_file_renderer(workspace.media_dir()),
    })?;
    let project_id = workspace.project.id.as_str();

    let (pb, on_progress) = progress_bar();
    match args.target {
        DeployTarget::Pool { options } => {
            let options = options
                .map(|raw| {
                    serde_json::from_str(&raw).map_err(|e| {
                        CliError::Config(format!("invalid --options JSON: {}", e))
                    })
                })
                .transpose()?;
            let preview = orchestrator
                .deploy_to_pool(project_id, options, Some(on_progress))
                .await;
            pb.finish_and_clear();
            let preview = preview?;
            print_ok(format!(
                "Submitted {} to the scene pool ({} byte preview)",
                style(&workspace.project.title).cyan(),
                preview.len()
            ));
        }
        DeployTarget::Land {
            x,
            y,
            rotation,
            override_id,
        } => {
            let placement = Placement::new(Coord::new(x, y), rotation.into());
            let deployment = orchestrator
                .deploy_to_land(
                    project_id,
                    placement,
                    override_id.as_deref(),
                    Some(on_progress),
                )
                .await;
            pb.finish_and_clear();
            report(&deployment?);
        }
        DeployTarget::World { name } => {
            let deployment = orchestrator
                .deploy_to_world(project_id, &name, Some(on_progress))
                .await;
            pb.finish_and_clear();
            report(&deployment?);
        }
    }
    Ok(())
}

fn report(deployment: &Deployment) {
    print_ok(format!(
        "Deployed {} as {}",
        style(&deployment.name).cyan(),
        style(&deployment.id).dim()
    ));
    match &deployment.world {
        Some(world) => println!("  World:   {}", world),
        None => println!("  Parcels: {}", deployment.parcels.join(" ")),
    }
    if let Some(thumbnail) = &deployment.thumbnail {
        println!("  Preview: {}", thumbnail);
    }
}
