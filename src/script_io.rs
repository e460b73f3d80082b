//! Reading and discovering SQL scripts

use std::path::{Path, PathBuf};

use encoding_rs::WINDOWS_1252;

use crate::error::RewriteError;

/// A script found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFile {
    pub path: PathBuf,
    /// Path relative to the input it was found under. For a file given
    /// directly this is its file name.
    pub relative_path: PathBuf,
}

/// Read a script, trying UTF-8 first, then Windows-1252 as fallback
pub fn read_script(path: &Path) -> Result<String, RewriteError> {
    read_with_encoding_fallback(path).map_err(|source| RewriteError::ScriptRead {
        path: path.to_path_buf(),
        source,
    })
}

fn read_with_encoding_fallback(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(strip_bom(s)),
        Err(e) => {
            // Fall back to Windows-1252 (common for SQL files created on Windows)
            let bytes = e.into_bytes();
            let (decoded, _, had_errors) = WINDOWS_1252.decode(&bytes);
            if had_errors {
                Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "File contains invalid characters",
                ))
            } else {
                Ok(decoded.into_owned())
            }
        }
    }
}

fn strip_bom(s: String) -> String {
    match s.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => s,
    }
}

/// Expand files and directories into the `.sql` scripts they contain.
///
/// Directories are walked recursively, skipping `bin` and `obj` build
/// output. Results are sorted by path within each input.
pub fn collect_scripts(inputs: &[PathBuf]) -> Result<Vec<ScriptFile>, RewriteError> {
    let mut scripts = Vec::new();

    for input in inputs {
        if input.is_file() {
            let relative_path = input
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| input.clone());
            scripts.push(ScriptFile {
                path: input.clone(),
                relative_path,
            });
            continue;
        }

        if !input.is_dir() {
            return Err(RewriteError::ScriptRead {
                path: input.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
            });
        }

        let mut found: Vec<ScriptFile> = walkdir::WalkDir::new(input)
            .into_iter()
            .filter_entry(|entry| !is_build_output(entry.path()))
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"))
            })
            .map(|entry| {
                let path = entry.path().to_path_buf();
                let relative_path = path
                    .strip_prefix(input)
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|_| path.clone());
                ScriptFile {
                    path,
                    relative_path,
                }
            })
            .collect();
        found.sort_by(|a, b| a.path.cmp(&b.path));
        scripts.extend(found);
    }

    Ok(scripts)
}

fn is_build_output(path: &Path) -> bool {
    path.is_dir()
        && path
            .file_name()
            .is_some_and(|name| name == "bin" || name == "obj")
}
