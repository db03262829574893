use std::path::{Path, PathBuf};

use tracing::debug;

use crate::meta::{MetaMap, is_meta_file, read_meta_dir};
use crate::route::Route;

/// Extensions of documentation content files.
pub const CONTENT_EXTENSIONS: [&str; 2] = ["mdx", "md"];

/// Directory names that never contribute routes.
const SKIPPED_DIRS: [&str; 2] = ["node_modules", ".git"];

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid path: {}", .0.display())]
    InvalidPath(PathBuf),
}

impl ScanError {
    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> ScanError + '_ {
        move |source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Walks a documentation tree and lists its routable pages.
///
/// The walk is depth-first: a directory's children are emitted before the
/// directory's own index route. Entries are visited in the order the
/// operating system lists them, which is not sorted.
pub struct RouteScanner {
    root: PathBuf,
}

impl RouteScanner {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scan the whole tree.
    ///
    /// Metadata problems only cost titles; filesystem errors abort the scan.
    /// Routes are not deduplicated: `foo.mdx` next to `foo/index.mdx` yields
    /// `/foo` twice.
    pub fn scan(&self) -> Result<Vec<Route>, ScanError> {
        debug!("Scanning: {}", self.root.display());

        let mut routes = Vec::new();
        self.scan_dir(&self.root, &mut routes)?;
        Ok(routes)
    }

    fn scan_dir(&self, dir: &Path, routes: &mut Vec<Route>) -> Result<(), ScanError> {
        let entries = std::fs::read_dir(dir).map_err(ScanError::io(dir))?;
        let meta = read_meta_dir(dir);

        for entry in entries {
            let entry = entry.map_err(ScanError::io(dir))?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            // Follows symlinks, so a linked directory is walked like a real one.
            let metadata = std::fs::metadata(&path).map_err(ScanError::io(&path))?;

            if metadata.is_dir() {
                if is_skipped_dir(&name) {
                    debug!("Skipping directory: {}", path.display());
                    continue;
                }

                self.scan_dir(&path, routes)?;

                if has_index(&path) {
                    let route_path = self.relative_route_path(&path)?;
                    routes.push(Route::new(route_path, title_for(meta.as_ref(), &name)));
                }
            } else if let Some(stem) = content_stem(&name) {
                if is_meta_file(&name) {
                    continue;
                }

                let relative = self.relative_route_path(&path)?;
                let route_path = strip_content_extension(&relative);
                let route_path = route_path.strip_suffix("/page").unwrap_or(route_path);

                // Index pages belong to their directory.
                if is_index_path(route_path) {
                    continue;
                }

                routes.push(Route::new(route_path, title_for(meta.as_ref(), stem)));
            }
        }

        Ok(())
    }

    /// `path` relative to the scan root, joined with `/` on every platform.
    fn relative_route_path(&self, path: &Path) -> Result<String, ScanError> {
        let relative = path
            .strip_prefix(&self.root)
            .map_err(|_| ScanError::InvalidPath(path.to_path_buf()))?;

        let segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        Ok(segments.join("/"))
    }
}

fn is_skipped_dir(name: &str) -> bool {
    SKIPPED_DIRS.contains(&name) || name.starts_with('.')
}

fn has_index(dir: &Path) -> bool {
    CONTENT_EXTENSIONS
        .iter()
        .any(|ext| dir.join(format!("index.{ext}")).is_file())
}

/// The file name without its content extension, or `None` for non-content files.
fn content_stem(name: &str) -> Option<&str> {
    CONTENT_EXTENSIONS
        .iter()
        .find_map(|ext| name.strip_suffix(ext)?.strip_suffix('.'))
}

fn strip_content_extension(path: &str) -> &str {
    CONTENT_EXTENSIONS
        .iter()
        .find_map(|ext| path.strip_suffix(ext)?.strip_suffix('.'))
        .unwrap_or(path)
}

/// Matches on the raw suffix, so `reindex` is treated as an index page too.
fn is_index_path(route_path: &str) -> bool {
    route_path.ends_with("index")
}

fn title_for(meta: Option<&MetaMap>, key: &str) -> Option<String> {
    meta.and_then(|m| m.title(key)).map(str::to_string)
}
