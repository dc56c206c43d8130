//! Deployments command - inspect and clear published scenes.

use std::path::PathBuf;

use clap::Subcommand;
use console::style;
use scenedeploy::config::ConfigFile;
use scenedeploy::coord::{id_to_coords, Coord};
use scenedeploy::deployment::{Deployment, DeploymentOrchestrator};
use scenedeploy::land::{EstateIndex, LandSelection};

use super::common::{build_orchestrator, no_renderer, print_ok, read_json, Wiring};
use crate::error::CliError;

#[derive(Debug, Subcommand)]
pub enum DeploymentsCommands {
    /// List deployments on parcels, estates or worlds
    List {
        /// Parcel ids ("x,y"); repeatable
        #[arg(long = "coords", value_name = "X,Y", allow_hyphen_values = true)]
        coords: Vec<String>,

        /// Estate ids; requires --estates-file
        #[arg(long = "estate")]
        estates: Vec<String>,

        /// JSON object mapping estate id to member parcel ids
        #[arg(long)]
        estates_file: Option<PathBuf>,

        /// World names; repeatable
        #[arg(long = "world")]
        worlds: Vec<String>,
    },

    /// Replace a land deployment with an empty scene
    Clear {
        /// Deployment (entity) id
        id: String,

        /// A parcel covered by the deployment
        #[arg(long, value_name = "X,Y", allow_hyphen_values = true)]
        coords: String,
    },
}

pub async fn run(command: DeploymentsCommands, config: &ConfigFile) -> Result<(), CliError> {
    let orchestrator = build_orchestrator(Wiring {
        config,
        workspace: None,
        author: None,
        capture: no_renderer(),
    })?;

    match command {
        DeploymentsCommands::List {
            coords,
            estates,
            estates_file,
            worlds,
        } => {
            let index = match &estates_file {
                Some(path) => read_json::<EstateIndex>(path)?,
                None if estates.is_empty() => EstateIndex::new(),
                None => {
                    return Err(CliError::Config(
                        "--estate requires --estates-file".to_string(),
                    ))
                }
            };
            list(&orchestrator, coords, estates, &index, &worlds).await
        }
        DeploymentsCommands::Clear { id, coords } => {
            let parcel = parse_parcel(&coords)?;
            orchestrator.fetch_deployments(&[parcel.to_id()]).await?;
            let cleared = orchestrator.clear_deployment(&id).await?;
            print_ok(format!("Cleared {}", style(cleared).dim()));
            Ok(())
        }
    }
}

async fn list(
    orchestrator: &DeploymentOrchestrator,
    coords: Vec<String>,
    estates: Vec<String>,
    index: &EstateIndex,
    worlds: &[String],
) -> Result<(), CliError> {
    let mut lands = Vec::with_capacity(coords.len() + estates.len());
    for id in &coords {
        let Coord { x, y } = parse_parcel(id)?;
        lands.push(LandSelection::Parcel { x, y });
    }
    lands.extend(estates.into_iter().map(|id| LandSelection::Estate { id }));

    let mut deployments = orchestrator.fetch_land_deployments(&lands, index).await?;
    deployments.extend(orchestrator.fetch_world_deployments(worlds).await?);

    if deployments.is_empty() {
        println!("No deployments found.");
        return Ok(());
    }
    for deployment in &deployments {
        print_deployment(deployment);
    }
    Ok(())
}

fn parse_parcel(id: &str) -> Result<Coord, CliError> {
    id_to_coords(id).map_err(|e| CliError::Config(format!("{}, expected \"x,y\"", e)))
}

fn print_deployment(deployment: &Deployment) {
    let location = match &deployment.world {
        Some(world) => world.clone(),
        None => deployment.base.clone(),
    };
    println!(
        "{}  {:<24} {}",
        style(&deployment.id).dim(),
        location,
        style(&deployment.name).cyan()
    );
}
