use super::{display_path, read_tree};
use anyhow::{anyhow, Result};
use clap::Args;
use reshaper_editor::{OutlineNode, Workspace};
use reshaper_workspace::EditorConfig;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct OutlineArgs {
    /// Source file to outline
    pub file: PathBuf,

    /// Print the outline as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn outline(args: OutlineArgs, cwd: &Path) -> Result<()> {
    let config = EditorConfig::load(cwd)?;
    let path = cwd.join(&args.file);
    let outline = build_outline(&path, cwd, &config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outline)?);
    } else {
        print!("{}", outline.render());
    }
    Ok(())
}

fn build_outline(path: &Path, cwd: &Path, config: &EditorConfig) -> Result<OutlineNode> {
    let (_, tree) = read_tree(path)?;
    let key = display_path(path, cwd);

    let workspace = Workspace::with_options(config.workspace_options());
    let root = workspace.load_file_ast(&key, tree)?;
    let outline = root.to_outline();

    tracing::debug!(
        path = %key,
        elements = workspace.file(&key).map(|file| file.correlated_len()).unwrap_or_default(),
        "built outline"
    );
    if outline.children.is_empty() {
        return Err(anyhow!("{} has no statements", key));
    }
    Ok(outline)
}
