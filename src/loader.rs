//! This module provides the `DefinitionLoader` struct, responsible for loading machine
//! definitions from files and strings. Loading is the trust boundary: everything it
//! returns has passed structural validation.

use crate::types::{MachineDefinition, MooreError, MAX_DEFINITION_SIZE};
use crate::validator::validate;
use crate::{parser, records};
use std::fs;
use std::path::{Path, PathBuf};

/// File extensions accepted for machine definitions.
///
/// Note that `.json` files are read as the same plain-text dialects as `.txt`; no JSON
/// schema exists for machine definitions. The filter matches what the original tooling
/// accepted, and is documented here rather than silently surprising callers.
const ACCEPTED_EXTENSIONS: &[&str] = &["txt", "json"];

/// `DefinitionLoader` is a utility struct for loading Moore machine definitions.
/// It picks the dialect by content (quintuple when the states marker is present,
/// flat records otherwise), validates the result, and surfaces the full defect list
/// on failure.
pub struct DefinitionLoader;

impl DefinitionLoader {
    /// Loads and validates a single machine definition from `path`.
    ///
    /// # Errors
    ///
    /// * [`MooreError::File`] when the extension is not accepted, the file cannot be
    ///   read, or the file exceeds [`MAX_DEFINITION_SIZE`].
    /// * Any parse error from the selected dialect.
    /// * [`MooreError::Invalid`] with every defect when validation fails.
    pub fn load(path: &Path) -> Result<MachineDefinition, MooreError> {
        if !has_accepted_extension(path) {
            return Err(MooreError::File(format!(
                "Unsupported extension for {}: expected .txt or .json",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            MooreError::File(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Self::from_text(&content)
    }

    /// Parses and validates a definition from in-memory text, picking the dialect
    /// from the content.
    pub fn from_text(content: &str) -> Result<MachineDefinition, MooreError> {
        if content.len() > MAX_DEFINITION_SIZE {
            return Err(MooreError::File(format!(
                "Definition exceeds the {MAX_DEFINITION_SIZE} byte limit"
            )));
        }

        let definition = if parser::looks_like_quintuple(content) {
            parser::parse(content)?
        } else {
            records::parse(content)?
        };

        let defects = validate(&definition);
        if !defects.is_empty() {
            return Err(MooreError::Invalid(defects));
        }

        Ok(definition)
    }

    /// Loads every accepted definition file from `directory`.
    ///
    /// Directories and files with other extensions are skipped. Each accepted file
    /// yields one entry: the definition with its path, or the error it produced.
    pub fn load_all(directory: &Path) -> Vec<Result<(PathBuf, MachineDefinition), MooreError>> {
        if !directory.exists() {
            return vec![Err(MooreError::File(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(MooreError::File(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(MooreError::File(format!(
                            "Failed to read directory entry: {e}"
                        ))))
                    }
                };

                let path = entry.path();
                if path.is_dir() || !has_accepted_extension(&path) {
                    return None;
                }

                match Self::load(&path) {
                    Ok(definition) => Some(Ok((path, definition))),
                    Err(e) => Some(Err(MooreError::File(format!(
                        "Failed to load definition from {}: {}",
                        path.display(),
                        e
                    )))),
                }
            })
            .collect()
    }
}

fn has_accepted_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const QUINTUPLE_CONTENT: &str = "\
Estados Q:
S0,S1
Alfabeto de Entrada Σ:
0,1
Alfabeto de Salida Γ:
A,B
Estado Inicial q0:
S0
Tabla de Transición:
S0,A,S1,S0
S1,B,S0,S1
";

    const FLAT_CONTENT: &str = "\
# turnstile
Locked,coin,Unlocked,U
Locked,push,Locked,L
Unlocked,push,Locked,L
Unlocked,coin,Unlocked,U
";

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_quintuple_file() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "machine.txt", QUINTUPLE_CONTENT);

        let definition = DefinitionLoader::load(&path).unwrap();
        assert_eq!(definition.states, vec!["S0", "S1"]);
        assert_eq!(definition.transition_count(), 4);
    }

    #[test]
    fn test_load_flat_file_by_content() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "turnstile.txt", FLAT_CONTENT);

        let definition = DefinitionLoader::load(&path).unwrap();
        assert_eq!(definition.initial_state, "Locked");
        assert_eq!(definition.inputs, vec!["coin", "push"]);
    }

    #[test]
    fn test_json_extension_is_read_as_plain_text() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "machine.json", QUINTUPLE_CONTENT);

        let definition = DefinitionLoader::load(&path).unwrap();
        assert_eq!(definition.states, vec!["S0", "S1"]);
    }

    #[test]
    fn test_unsupported_extension_is_refused() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "machine.csv", QUINTUPLE_CONTENT);

        let error = DefinitionLoader::load(&path).unwrap_err();
        assert!(matches!(error, MooreError::File(_)));
        assert!(error.to_string().contains("Unsupported extension"));
    }

    #[test]
    fn test_invalid_definition_surfaces_all_defects() {
        let content = "A,x,B\nB,x,A\n"; // no outputs recorded at all
        let error = DefinitionLoader::from_text(content).unwrap_err();

        match error {
            MooreError::Invalid(defects) => {
                assert_eq!(defects.len(), 2);
                assert!(defects.iter().any(|d| d.contains("\"A\"")));
                assert!(defects.iter().any(|d| d.contains("\"B\"")));
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_oversized_definition_is_refused() {
        let content = "x".repeat(MAX_DEFINITION_SIZE + 1);
        let error = DefinitionLoader::from_text(&content).unwrap_err();
        assert!(matches!(error, MooreError::File(_)));
    }

    #[test]
    fn test_load_all_from_directory() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "valid.txt", QUINTUPLE_CONTENT);
        write_file(dir.path(), "broken.txt", "not a machine at all");
        write_file(dir.path(), "ignored.csv", QUINTUPLE_CONTENT);

        let results = DefinitionLoader::load_all(dir.path());
        assert_eq!(results.len(), 2);

        let ok = results.iter().filter(|r| r.is_ok()).count();
        let err = results.iter().filter(|r| r.is_err()).count();
        assert_eq!(ok, 1);
        assert_eq!(err, 1);
    }

    #[test]
    fn test_load_all_missing_directory() {
        let results = DefinitionLoader::load_all(Path::new("/definitely/not/here"));
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }
}
