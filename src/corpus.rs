use globset::{Glob, GlobMatcher};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// A document file inside one of the topic directories.
#[derive(Debug, Clone)]
pub struct Document {
    pub category: String,
    pub name: String,
    pub path: PathBuf,
}

impl Document {
    /// `"<category>/<name>"`, the form stored in the name index.
    pub fn location(&self) -> String {
        format!("{}/{}", self.category, self.name)
    }

    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Enumerates documents directly under the configured topic directories.
pub struct Corpus {
    root: PathBuf,
    matcher: GlobMatcher,
}

impl Corpus {
    pub fn new(root: &Path, document_glob: &str) -> Result<Corpus, Box<dyn std::error::Error>> {
        let matcher = Glob::new(document_glob)
            .map_err(|e| format!("Invalid document_glob '{}': {}", document_glob, e))?
            .compile_matcher();
        Ok(Corpus {
            root: root.to_path_buf(),
            matcher,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Documents in one category, sorted by file name. A missing directory
    /// yields nothing.
    pub fn documents(&self, category: &str) -> Vec<Document> {
        let dir = self.root.join(category);
        if !dir.is_dir() {
            return Vec::new();
        }

        let mut builder = WalkBuilder::new(&dir);
        builder
            .standard_filters(false)
            .hidden(true)
            .follow_links(true)
            .max_depth(Some(1))
            .sort_by_file_name(|a, b| a.cmp(b));

        let mut docs = Vec::new();
        for entry in builder.build().filter_map(|e| e.ok()) {
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let name = match entry.file_name().to_str() {
                Some(name) => name.to_string(),
                None => continue,
            };
            if !self.matcher.is_match(&name) {
                continue;
            }
            docs.push(Document {
                category: category.to_string(),
                name,
                path: entry.path().to_path_buf(),
            });
        }
        docs
    }

    /// Documents across `categories`, in configured order.
    pub fn all_documents(&self, categories: &[String]) -> Vec<Document> {
        categories.iter().flat_map(|c| self.documents(c)).collect()
    }
}
