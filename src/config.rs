use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Runtime configuration, loaded from `.relink.toml` when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub root: PathBuf,
    pub directories: Vec<String>,
    /// Scanned by `fix` and the name index, not by `verify`
    pub fix_extra_directories: Vec<String>,
    pub document_glob: String,
    pub root_uri: String,
    pub strict: bool,
    pub report_misses: bool,
    pub overrides: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            root: PathBuf::from("."),
            directories: [
                "00-overview",
                "01-requirements",
                "02-architecture",
                "03-implementation",
                "04-operations",
                "05-decisions",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            fix_extra_directories: vec!["06-tasks".to_string()],
            document_glob: "*.md".to_string(),
            root_uri: "file:///d:/nap-dms.lcbp3/specs/".to_string(),
            strict: false,
            report_misses: false,
            overrides: default_overrides(),
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Directory list used by the rewriter and the index builder.
    pub fn fix_directories(&self) -> Vec<String> {
        self.directories
            .iter()
            .chain(self.fix_extra_directories.iter())
            .cloned()
            .collect()
    }

    /// Canonicalize `root` so every later path computation is absolute.
    pub fn resolve_root(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.root = fs::canonicalize(&self.root)
            .map_err(|e| format!("Cannot open root {}: {}", self.root.display(), e))?;
        Ok(())
    }
}

/// Pinned renames, typos and removed files the derived keys cannot recover.
fn default_overrides() -> BTreeMap<String, String> {
    [
        ("fullftack-js-v1.5.0.md", "03-implementation/03-01-fullftack-js-v1.7.0.md"),
        ("fullstack-js-v1.5.0.md", "03-implementation/03-01-fullftack-js-v1.7.0.md"),
        ("system-architecture.md", "02-architecture/02-01-system-architecture.md"),
        ("api-design.md", "02-architecture/02-02-api-design.md"),
        ("data-model.md", "02-architecture/02-03-data-model.md"),
        ("backend-guidelines.md", "03-implementation/03-02-backend-guidelines.md"),
        ("frontend-guidelines.md", "03-implementation/03-03-frontend-guidelines.md"),
        ("document-numbering.md", "03-implementation/03-04-document-numbering.md"),
        ("testing-strategy.md", "03-implementation/03-05-testing-strategy.md"),
        ("deployment-guide.md", "04-operations/04-01-deployment-guide.md"),
        ("environment-setup.md", "04-operations/04-02-environment-setup.md"),
        ("monitoring-alerting.md", "04-operations/04-03-monitoring-alerting.md"),
        ("backup-recovery.md", "04-operations/04-04-backup-recovery.md"),
        ("maintenance-procedures.md", "04-operations/04-05-maintenance-procedures.md"),
        ("security-operations.md", "04-operations/04-06-security-operations.md"),
        ("incident-response.md", "04-operations/04-07-incident-response.md"),
        (
            "document-numbering-operations.md",
            "04-operations/04-08-document-numbering-operations.md",
        ),
        // Task files that no longer exist
        ("task-be-011-notification-audit.md", "06-tasks/README.md"),
        (
            "task-be-001-database-migrations.md",
            "06-tasks/TASK-BE-015-schema-v160-migration.md",
        ),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(&dir.path().join(".relink.toml")).unwrap();

        assert_eq!(config.directories.len(), 6);
        assert_eq!(config.directories[0], "00-overview");
        assert_eq!(config.document_glob, "*.md");
        assert_eq!(
            config.overrides.get("task-be-011-notification-audit.md").map(String::as_str),
            Some("06-tasks/README.md")
        );
        assert!(!config.strict);
    }

    #[test]
    fn test_fix_directories_appends_extras() {
        let config = Config::default();
        let dirs = config.fix_directories();
        assert_eq!(dirs.len(), 7);
        assert_eq!(dirs.last().map(String::as_str), Some("06-tasks"));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".relink.toml");
        fs::write(
            &path,
            "root = \"docs\"\ndirectories = [\"a\", \"b\"]\nstrict = true\n\n[overrides]\n\"old.md\" = \"a/new.md\"\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.root, PathBuf::from("docs"));
        assert_eq!(config.directories, vec!["a", "b"]);
        assert!(config.strict);
        // User table replaces the pinned one
        assert_eq!(config.overrides.len(), 1);
        assert_eq!(config.fix_extra_directories, vec!["06-tasks"]);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".relink.toml");
        fs::write(&path, "directories = 3").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
