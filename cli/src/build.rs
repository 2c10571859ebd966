use std::path::{Path, PathBuf};

use codespan_reporting::files::SimpleFiles;
use mdblocks::{BlockRegistry, ParseError, Parser};
use tracing::{debug, info};

use crate::error::CliError;

pub struct BuildOptions {
    pub docs_dir: PathBuf,
    pub site_dir: PathBuf,
    /// Remove `site_dir` before building.
    pub clean: bool,
}

/// What a build produced: the sources it read (for diagnostic display),
/// the diagnostics, and page counts.
pub struct BuildOutput {
    pub files: SimpleFiles<String, String>,
    pub diagnostics: Vec<ParseError>,
    pub pages: usize,
    pub assets: usize,
    /// Pages with at least one error diagnostic.
    pub failed_pages: usize,
}

/// Collect every file under `root`, sorted, as paths relative to `root`.
fn collect_files(dir: &Path, root: &Path, out: &mut Vec<PathBuf>) -> Result<(), CliError> {
    let entries = std::fs::read_dir(dir).map_err(|e| CliError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| CliError::io(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, root, out)?;
        } else if let Ok(relative) = path.strip_prefix(root) {
            out.push(relative.to_path_buf());
        }
    }
    Ok(())
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| CliError::io(parent, e))?;
    }
    std::fs::write(path, contents).map_err(|e| CliError::io(path, e))
}

/// Render every markdown page of `docs_dir` into `site_dir`, mirroring the
/// directory layout. Other files are copied unchanged.
pub fn build(options: &BuildOptions, registry: &BlockRegistry) -> Result<BuildOutput, CliError> {
    if options.clean && options.site_dir.exists() {
        info!(site_dir = %options.site_dir.display(), "cleaning site directory");
        std::fs::remove_dir_all(&options.site_dir)
            .map_err(|e| CliError::io(&options.site_dir, e))?;
    }

    let mut sources = Vec::new();
    collect_files(&options.docs_dir, &options.docs_dir, &mut sources)?;
    sources.sort();

    let mut output = BuildOutput {
        files: SimpleFiles::new(),
        diagnostics: Vec::new(),
        pages: 0,
        assets: 0,
        failed_pages: 0,
    };

    for relative in sources {
        let source_path = options.docs_dir.join(&relative);

        if !is_markdown(&relative) {
            let target = options.site_dir.join(&relative);
            let bytes = std::fs::read(&source_path).map_err(|e| CliError::io(&source_path, e))?;
            write_file(&target, &bytes)?;
            output.assets += 1;
            continue;
        }

        let source =
            std::fs::read_to_string(&source_path).map_err(|e| CliError::io(&source_path, e))?;
        let name = relative.display().to_string();
        let file_id = output.files.add(name.clone(), source.clone());

        let parsed = Parser::new(source, file_id, registry).parse();
        if parsed.has_errors() {
            output.failed_pages += 1;
        }
        debug!(page = %name, diagnostics = parsed.diagnostics.len(), "rendered page");

        let target = options.site_dir.join(relative.with_extension("html"));
        write_file(&target, parsed.document.to_string().as_bytes())?;
        output.diagnostics.extend(parsed.diagnostics);
        output.pages += 1;
    }

    info!(
        pages = output.pages,
        assets = output.assets,
        site_dir = %options.site_dir.display(),
        "build finished"
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn options(root: &Path) -> BuildOptions {
        BuildOptions {
            docs_dir: root.join("docs"),
            site_dir: root.join("site"),
            clean: false,
        }
    }

    #[test]
    fn renders_pages_and_copies_assets() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "docs/index.md", "# Home\n\n/// version-added | v2\n///\n");
        write(root, "docs/guide/usage.md", "Usage.\n");
        write(root, "docs/img/logo.svg", "<svg/>");

        let registry = extensions::registry();
        let output = build(&options(root), &registry).unwrap();

        assert_eq!(output.pages, 2);
        assert_eq!(output.assets, 1);
        assert_eq!(output.failed_pages, 0);
        assert!(output.diagnostics.is_empty());

        let index = std::fs::read_to_string(root.join("site/index.html")).unwrap();
        assert!(index.starts_with("<h1>Home</h1>\n"));
        assert!(index.contains("Added in v2."));
        assert_eq!(
            std::fs::read_to_string(root.join("site/guide/usage.html")).unwrap(),
            "<p>Usage.</p>\n"
        );
        assert!(root.join("site/img/logo.svg").is_file());
    }

    #[test]
    fn block_errors_are_collected_per_page() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "docs/a.md", "/// version-added\n///\n");
        write(root, "docs/b.md", "/// deprecated-removed | v1\n///\n\n/// version-changed\n///\n");

        let registry = extensions::registry();
        let output = build(&options(root), &registry).unwrap();

        assert_eq!(output.pages, 2);
        assert_eq!(output.failed_pages, 2);
        assert_eq!(output.diagnostics.len(), 3);
        // Pages still render without the rejected blocks.
        assert_eq!(std::fs::read_to_string(root.join("site/a.html")).unwrap(), "");
    }

    #[test]
    fn clean_removes_stale_output() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "docs/index.md", "Hi\n");
        write(root, "site/stale.html", "old");

        let registry = extensions::registry();
        let mut opts = options(root);
        opts.clean = true;
        build(&opts, &registry).unwrap();

        assert!(!root.join("site/stale.html").exists());
        assert!(root.join("site/index.html").is_file());
    }

    #[test]
    fn missing_docs_dir_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let registry = extensions::registry();
        let err = build(&options(dir.path()), &registry).err().unwrap();
        assert!(matches!(err, CliError::Io { .. }));
    }
}
