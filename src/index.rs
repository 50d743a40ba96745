use crate::corpus::Corpus;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

/// A derived key that was reassigned to a different document.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Collision {
    pub key: String,
    pub previous: String,
    pub replacement: String,
}

/// Maps any name a historical link might use to the document's current
/// `"<category>/<file>"` location.
///
/// Keys are lowercase. Insertion is an ordered merge: categories in
/// configured order, files by name within a category, and a later insert
/// replaces an earlier one. Overrides go in last and always win.
#[derive(Serialize, Debug, Default)]
pub struct NameIndex {
    entries: BTreeMap<String, String>,
    collisions: Vec<Collision>,
}

impl NameIndex {
    pub fn build(
        corpus: &Corpus,
        categories: &[String],
        overrides: &BTreeMap<String, String>,
    ) -> Result<NameIndex, regex::Error> {
        let deriver = KeyDeriver::new()?;
        let mut index = NameIndex::default();

        for doc in corpus.all_documents(categories) {
            let location = doc.location();
            for key in deriver.keys(&doc.name) {
                index.insert_derived(key, &location);
            }
        }

        for (key, location) in overrides {
            index.entries.insert(key.to_lowercase(), location.clone());
        }

        Ok(index)
    }

    fn insert_derived(&mut self, key: String, location: &str) {
        if let Some(previous) = self.entries.insert(key.clone(), location.to_string()) {
            if previous != location {
                self.collisions.push(Collision {
                    key,
                    previous,
                    replacement: location.to_string(),
                });
            }
        }
    }

    /// Case-insensitive lookup of a file name.
    pub fn lookup(&self, file_name: &str) -> Option<&str> {
        self.entries
            .get(&file_name.to_lowercase())
            .map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }
}

/// Derives lookup keys from conventionally prefixed file names.
pub struct KeyDeriver {
    // "01-03.1-" or "01-01-"
    compound: Regex,
    // "04-"
    simple: Regex,
    // "ADR-001-"
    decision: Regex,
}

impl KeyDeriver {
    pub fn new() -> Result<KeyDeriver, regex::Error> {
        Ok(KeyDeriver {
            compound: Regex::new(r"^\d+-\d+\.?\d*-?(.*)")?,
            simple: Regex::new(r"^\d+-(.*)")?,
            decision: Regex::new(r"^ADR-\d+-(.*)")?,
        })
    }

    /// Keys for `name` in insertion order, starting with the name itself.
    ///
    /// Patterns are tried independently. A compound match also yields the
    /// name with only its leading number stripped, so `01-03.1-pm.md` is
    /// reachable as `pm.md` and as `03.1-pm.md`.
    pub fn keys(&self, name: &str) -> Vec<String> {
        let mut keys = vec![name.to_lowercase()];

        for (re, is_compound) in [
            (&self.compound, true),
            (&self.simple, false),
            (&self.decision, false),
        ] {
            let Some(rest) = remainder(re, name) else {
                continue;
            };
            if !rest.is_empty() {
                keys.push(rest.to_lowercase());
            }
            if is_compound {
                if let Some(partial) = remainder(&self.simple, name).filter(|r| !r.is_empty()) {
                    keys.push(partial.to_lowercase());
                }
            }
        }

        keys
    }
}

fn remainder<'a>(re: &Regex, name: &'a str) -> Option<&'a str> {
    re.captures(name).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn touch(root: &Path, category: &str, name: &str) {
        let dir = root.join(category);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), "# doc\n").unwrap();
    }

    fn categories(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_keys_compound_prefix() {
        let deriver = KeyDeriver::new().unwrap();
        let keys = deriver.keys("01-03.1-Project-Management.md");

        assert_eq!(keys[0], "01-03.1-project-management.md");
        assert!(keys.contains(&"project-management.md".to_string()));
        assert!(keys.contains(&"03.1-project-management.md".to_string()));
    }

    #[test]
    fn test_keys_simple_and_decision_prefix() {
        let deriver = KeyDeriver::new().unwrap();

        let keys = deriver.keys("04-deployment.md");
        assert!(keys.contains(&"deployment.md".to_string()));

        let keys = deriver.keys("ADR-002-Use-Redis.md");
        assert_eq!(keys, vec!["adr-002-use-redis.md", "use-redis.md"]);
    }

    #[test]
    fn test_keys_unprefixed_name() {
        let deriver = KeyDeriver::new().unwrap();
        assert_eq!(deriver.keys("README.md"), vec!["readme.md"]);
    }

    #[test]
    fn test_build_registers_derived_keys() {
        let temp = tempdir().unwrap();
        touch(temp.path(), "02-architecture", "02-01-system-architecture.md");
        touch(temp.path(), "05-decisions", "ADR-001-monorepo.md");

        let corpus = Corpus::new(temp.path(), "*.md").unwrap();
        let cats = categories(&["02-architecture", "05-decisions"]);
        let index = NameIndex::build(&corpus, &cats, &BTreeMap::new()).unwrap();

        assert_eq!(
            index.lookup("system-architecture.md"),
            Some("02-architecture/02-01-system-architecture.md")
        );
        assert_eq!(
            index.lookup("01-system-architecture.md"),
            Some("02-architecture/02-01-system-architecture.md")
        );
        assert_eq!(index.lookup("Monorepo.md"), Some("05-decisions/ADR-001-monorepo.md"));
        assert_eq!(index.lookup("missing.md"), None);
    }

    #[test]
    fn test_later_category_wins_and_is_recorded() {
        let temp = tempdir().unwrap();
        touch(temp.path(), "01-requirements", "01-glossary.md");
        touch(temp.path(), "02-architecture", "02-glossary.md");

        let corpus = Corpus::new(temp.path(), "*.md").unwrap();
        let cats = categories(&["01-requirements", "02-architecture"]);
        let index = NameIndex::build(&corpus, &cats, &BTreeMap::new()).unwrap();

        assert_eq!(index.lookup("glossary.md"), Some("02-architecture/02-glossary.md"));
        assert_eq!(index.collisions().len(), 1);
        assert_eq!(index.collisions()[0].key, "glossary.md");
        assert_eq!(index.collisions()[0].previous, "01-requirements/01-glossary.md");
    }

    #[test]
    fn test_override_beats_exact_name() {
        let temp = tempdir().unwrap();
        touch(temp.path(), "03-implementation", "old-name.md");
        touch(temp.path(), "06-tasks", "README.md");

        let mut overrides = BTreeMap::new();
        overrides.insert("old-name.md".to_string(), "06-tasks/README.md".to_string());

        let corpus = Corpus::new(temp.path(), "*.md").unwrap();
        let cats = categories(&["03-implementation", "06-tasks"]);
        let index = NameIndex::build(&corpus, &cats, &overrides).unwrap();

        assert_eq!(index.lookup("old-name.md"), Some("06-tasks/README.md"));
        assert!(index.collisions().is_empty());
    }

    #[test]
    fn test_missing_directories_are_skipped() {
        let temp = tempdir().unwrap();
        let corpus = Corpus::new(temp.path(), "*.md").unwrap();
        let index = NameIndex::build(&corpus, &categories(&["00-overview"]), &BTreeMap::new()).unwrap();
        assert!(index.is_empty());
    }
}
