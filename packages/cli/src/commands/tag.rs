use super::{display_path, read_tree};
use anyhow::Result;
use clap::Args;
use reshaper_syntax::{annotate, print};
use reshaper_workspace::EditorConfig;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct TagArgs {
    /// Source file to tag
    pub file: PathBuf,

    /// Attribute to tag elements with (overrides config)
    #[arg(short, long)]
    pub attribute: Option<String>,
}

/// Print the file with every element tagged for the preview
pub fn tag(args: TagArgs, cwd: &Path) -> Result<()> {
    let config = EditorConfig::load(cwd)?;
    let attribute = args.attribute.unwrap_or(config.tag_attribute);

    let path = cwd.join(&args.file);
    print!("{}", tagged_source(&path, cwd, &attribute)?);
    Ok(())
}

fn tagged_source(path: &Path, cwd: &Path, attribute: &str) -> Result<String> {
    let (_, tree) = read_tree(path)?;
    let key = display_path(path, cwd);
    Ok(print(&annotate(&tree, &key, attribute)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_tagged_source() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("App.jsx");
        fs::write(&file, "x = <ul><li>a</li></ul>;\n").unwrap();

        let tagged = tagged_source(&file, dir.path(), "data-loc").unwrap();
        assert_eq!(
            tagged,
            "x = <ul data-loc=\"App.jsx:0\"><li data-loc=\"App.jsx:1\">a</li></ul>;\n"
        );
    }
}
