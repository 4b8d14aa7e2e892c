pub mod init;
pub mod outline;
pub mod tag;
pub mod watch;

pub use init::{init, InitArgs};
pub use outline::{outline, OutlineArgs};
pub use tag::{tag, TagArgs};
pub use watch::{watch, WatchArgs};

use anyhow::{anyhow, Result};
use reshaper_syntax::{format_error, parse, SyntaxTree};
use std::fs;
use std::path::Path;

/// Read and parse a source file, rendering syntax errors against the source
pub(crate) fn read_tree(path: &Path) -> Result<(String, SyntaxTree)> {
    let source = fs::read_to_string(path)
        .map_err(|e| anyhow!("Cannot read {}: {}", path.display(), e))?;

    let tree = parse(&source).map_err(|e| {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        anyhow!("\n{}", format_error(&source, file_name, &e))
    })?;

    Ok((source, tree))
}

/// Path as shown to the user and used as the file key
pub(crate) fn display_path(path: &Path, cwd: &Path) -> String {
    path.strip_prefix(cwd)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
