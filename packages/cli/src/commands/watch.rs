use super::display_path;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use reshaper_workspace::{DiskIo, EditorConfig, EditorState, FileWatcher, SourceIo};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Directory to watch (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

/// Keep every changed source file loaded and report its element count
pub fn watch(args: WatchArgs, cwd: &Path) -> Result<()> {
    let config = EditorConfig::load(cwd)?;
    let dir = cwd.join(&args.path);
    let watcher = FileWatcher::new(&dir)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let mut state = EditorState::new(DiskIo::new(cwd), config);

    println!(
        "{} {}",
        "👀 Watching".bright_blue().bold(),
        dir.display()
    );

    loop {
        let paths = watcher.next_change()?;
        for path in paths {
            let key = display_path(&path, cwd);
            match runtime.block_on(sync_file(&mut state, &key)) {
                Ok(elements) => println!("  {} {} ({} elements)", "✓".green(), key, elements),
                Err(e) => eprintln!("  {} {} - {}", "✗".red(), key, e.to_string().red()),
            }
        }
    }
}

/// Load a file or pick up its new contents, returning its element count
async fn sync_file<S: SourceIo>(state: &mut EditorState<S>, path: &str) -> Result<usize> {
    if state.workspace().is_loaded(path) {
        state.reload_file(path).await?;
    } else {
        state.load_file(path).await?;
    }

    let elements = state
        .workspace()
        .file(path)
        .map(|file| file.correlated_len())
        .unwrap_or_default();
    tracing::debug!(path, elements, "synced file");
    Ok(elements)
}
