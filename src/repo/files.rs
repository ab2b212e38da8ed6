//! Direct filesystem operations relative to the working directory.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, error};

use super::RepoManager;
use crate::error::{Error, Result};

/// How `edit_file` interprets its search text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Replace {
    /// Exact substring match.
    #[default]
    Literal,
    /// Regular expression; the replacement may use `$1`/`${name}` groups.
    Pattern,
}

impl RepoManager<'_> {
    /// Reads a UTF-8 file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<String> {
        Ok(std::fs::read_to_string(self.resolve(path))?)
    }

    /// Writes or appends `content`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or the file cannot be written.
    pub fn write_file(&self, path: impl AsRef<Path>, content: &str, append: bool) -> Result<()> {
        let path = self.resolve(path);
        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .append(append)
                .truncate(!append)
                .open(&path)?;
            file.write_all(content.as_bytes())
        };
        write().map_err(|err| {
            error!(path = %path.display(), error = %err, "failed to write file");
            Error::from(err)
        })
    }

    /// Replaces every occurrence of `find` with `replace` and returns the count.
    ///
    /// The file is only rewritten when something matched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] without creating anything when the file
    /// is absent, and an error for an invalid pattern or failed I/O.
    pub fn edit_file(
        &self,
        path: impl AsRef<Path>,
        find: &str,
        replace: &str,
        mode: Replace,
    ) -> Result<usize> {
        let path = self.resolve(path);
        if !path.is_file() {
            error!(path = %path.display(), "file does not exist");
            return Err(Error::FileNotFound(path));
        }
        let content = std::fs::read_to_string(&path)?;

        let (count, updated) = match mode {
            Replace::Literal if find.is_empty() => (0, content.clone()),
            Replace::Literal => (
                content.matches(find).count(),
                content.replace(find, replace),
            ),
            Replace::Pattern => {
                let re = Regex::new(find)?;
                (
                    re.find_iter(&content).count(),
                    re.replace_all(&content, replace).into_owned(),
                )
            }
        };

        if count > 0 {
            std::fs::write(&path, updated)?;
        }
        debug!(path = %path.display(), count, "file edited");
        Ok(count)
    }

    /// Files directly in the working directory, or those matching a glob.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid pattern or an unreadable directory.
    pub fn list_files(&self, pattern: Option<&str>) -> Result<Vec<PathBuf>> {
        self.list_entries(pattern, Path::is_file)
    }

    /// Subdirectories of the working directory, or those matching a glob.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid pattern or an unreadable directory.
    pub fn list_dirs(&self, pattern: Option<&str>) -> Result<Vec<PathBuf>> {
        self.list_entries(pattern, Path::is_dir)
    }

    fn list_entries(&self, pattern: Option<&str>, keep: fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
        let mut entries: Vec<PathBuf> = match pattern {
            Some(pattern) => {
                let base = glob::Pattern::escape(&self.cwd.to_string_lossy());
                let full = Path::new(&base).join(pattern);
                glob::glob(&full.to_string_lossy())?
                    .filter_map(|entry| match entry {
                        Ok(path) => Some(path),
                        Err(err) => {
                            debug!(error = %err, "skipping unreadable glob entry");
                            None
                        }
                    })
                    .filter(|path| keep(path))
                    .collect()
            }
            None => std::fs::read_dir(&self.cwd)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| keep(path))
                .collect(),
        };
        entries.sort();
        Ok(entries)
    }
}
