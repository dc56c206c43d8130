//! Package command - write a scene package to disk without deploying.

use std::path::PathBuf;

use clap::Args;
use scenedeploy::client::HttpAssetFetcher;
use scenedeploy::config::ConfigFile;
use scenedeploy::content::make_content_files;
use scenedeploy::coord::{Coord, Placement};
use scenedeploy::packager::{create_files, CreateFilesOptions};

use super::common::{print_ok, progress_bar, RotationArg, Workspace};
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct PackageArgs {
    /// Workspace directory holding project.json and scene.json
    #[arg(short, long, default_value = ".")]
    pub workspace: PathBuf,

    /// Base parcel X
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub x: i32,

    /// Base parcel Y
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub y: i32,

    #[arg(long, value_enum, default_value = "north")]
    pub rotation: RotationArg,

    /// Package for a world instead of land
    #[arg(long)]
    pub world: Option<String>,

    /// Author name written to the scene contact
    #[arg(long)]
    pub author: Option<String>,

    /// Output directory
    #[arg(short, long)]
    pub out: PathBuf,
}

pub async fn run(args: PackageArgs, config: &ConfigFile) -> Result<(), CliError> {
    let workspace = Workspace::load(&args.workspace)?;
    let placement = Placement::new(Coord::new(args.x, args.y), args.rotation.into());
    let fetcher = HttpAssetFetcher::new(&config.builder.assets_url)?;

    let (pb, on_progress) = progress_bar();
    let options = CreateFilesOptions::new(&workspace.project, &workspace.scene, placement)
        .with_author(args.author)
        .with_world(args.world)
        .with_progress(Some(on_progress));
    let files = create_files(options, &fetcher).await?;
    pb.finish_and_clear();

    for (path, data) in &files {
        let target = args.out.join(path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CliError::io(parent, e))?;
        }
        std::fs::write(&target, data).map_err(|e| CliError::io(&target, e))?;
    }

    for file in make_content_files(&files) {
        println!("  {}  {}", file.hash, file.path);
    }
    print_ok(format!(
        "Wrote {} files to {}",
        files.len(),
        args.out.display()
    ));
    Ok(())
}
