//! Policy Pack Loader: reads JSON rule definitions from a bundled directory
//! plus an ordered list of extra paths, merging by ID with last-wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{PolicyPackFile, RuleDefinition};

pub struct PolicyPackLoader;

impl PolicyPackLoader {
    /// Enumerates every `.json` file under `bundled_dir` (recursively, if it
    /// exists) followed by every path in `extra_paths` that exists, parses
    /// each as a policy pack, and merges the resulting rule definitions by
    /// upper-cased ID. A file seen later — whether because it sorts later
    /// under the bundled directory or because it appears later in
    /// `extra_paths` — replaces an earlier definition of the same ID.
    ///
    /// Per-file failures (I/O errors, malformed JSON, missing required
    /// fields) are logged and the offending file or rule entry is skipped;
    /// they never abort the whole load.
    pub fn load(bundled_dir: &Path, extra_paths: &[PathBuf]) -> HashMap<String, RuleDefinition> {
        let mut merged: HashMap<String, RuleDefinition> = HashMap::new();

        for path in Self::enumerate_bundled(bundled_dir) {
            Self::load_file_into(&path, &mut merged);
        }
        for path in extra_paths {
            if path.exists() {
                Self::load_file_into(path, &mut merged);
            } else {
                tracing::warn!("policy pack path does not exist, skipping: {}", path.display());
            }
        }

        merged
    }

    fn enumerate_bundled(bundled_dir: &Path) -> Vec<PathBuf> {
        if !bundled_dir.exists() {
            tracing::warn!(
                "bundled policy pack directory does not exist: {}",
                bundled_dir.display()
            );
            return Vec::new();
        }
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(bundled_dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("json"))
            .collect();
        files.sort();
        files
    }

    fn load_file_into(path: &Path, merged: &mut HashMap<String, RuleDefinition>) {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("failed to read policy pack '{}': {}", path.display(), err);
                return;
            }
        };
        let pack: PolicyPackFile = match serde_json::from_str(&content) {
            Ok(pack) => pack,
            Err(err) => {
                tracing::warn!("failed to parse policy pack '{}': {}", path.display(), err);
                return;
            }
        };

        for raw in pack.rules {
            match Self::parse_rule(raw) {
                Ok(def) => {
                    let id = def.id.to_ascii_uppercase();
                    merged.insert(id, def);
                }
                Err(message) => {
                    tracing::warn!("skipping malformed rule in '{}': {}", path.display(), message);
                }
            }
        }
    }

    fn parse_rule(raw: serde_json::Value) -> Result<RuleDefinition, String> {
        let mut def: RuleDefinition =
            serde_json::from_value(raw).map_err(|err| err.to_string())?;
        if def.id.trim().is_empty() {
            return Err("missing required field 'id'".to_string());
        }
        if def.title.trim().is_empty() {
            return Err("missing required field 'title'".to_string());
        }
        if def.message.trim().is_empty() {
            return Err("missing required field 'message'".to_string());
        }
        if def.category.trim().is_empty() {
            return Err("missing required field 'category'".to_string());
        }
        def.id = def.id.to_ascii_uppercase();
        Ok(def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_pack(dir: &Path, name: &str, json: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(json.as_bytes()).unwrap();
        path
    }

    #[test]
    fn merges_rules_across_files_last_wins() {
        let dir = tempfile::tempdir().unwrap();
        write_pack(
            dir.path(),
            "a.json",
            r#"{"rules": [{"id": "ush0001", "title": "A", "message": "m", "category": "Network", "defaultSeverity": "error"}]}"#,
        );
        write_pack(
            dir.path(),
            "b.json",
            r#"{"rules": [{"id": "USH0001", "title": "B", "message": "m2", "category": "Network", "defaultSeverity": "warning"}]}"#,
        );

        let merged = PolicyPackLoader::load(dir.path(), &[]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.get("USH0001").unwrap().title, "B");
    }

    #[test]
    fn skips_malformed_file_without_aborting_others() {
        let dir = tempfile::tempdir().unwrap();
        write_pack(dir.path(), "bad.json", "{ not json");
        write_pack(
            dir.path(),
            "good.json",
            r#"{"rules": [{"id": "USH0044", "title": "T", "message": "m", "category": "Structure", "defaultSeverity": "error"}]}"#,
        );

        let merged = PolicyPackLoader::load(dir.path(), &[]);
        assert_eq!(merged.len(), 1);
        assert!(merged.contains_key("USH0044"));
    }

    #[test]
    fn skips_rule_missing_required_field() {
        let dir = tempfile::tempdir().unwrap();
        write_pack(
            dir.path(),
            "partial.json",
            r#"{"rules": [{"title": "no id", "message": "m", "category": "Network", "defaultSeverity": "error"}]}"#,
        );
        let merged = PolicyPackLoader::load(dir.path(), &[]);
        assert!(merged.is_empty());
    }

    #[test]
    fn missing_bundled_dir_warns_but_does_not_panic() {
        let merged = PolicyPackLoader::load(Path::new("/nonexistent/path/for/sure"), &[]);
        assert!(merged.is_empty());
    }
}
