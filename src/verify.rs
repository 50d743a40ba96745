use crate::corpus::Corpus;
use crate::links::{file_uri_path, normalize, split_anchor, strip_root_uri, LinkKind, LinkScanner};
use crate::report::Reporter;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BrokenLink {
    pub source: String,
    pub label: String,
    pub target: String,
    pub resolved: String,
}

#[derive(Serialize, Debug, Default)]
pub struct VerifyReport {
    pub total_links: usize,
    pub broken_links: Vec<BrokenLink>,
}

/// Read-only audit of internal links.
pub struct Verifier<'a> {
    corpus: &'a Corpus,
    scanner: LinkScanner,
    root_uri: String,
}

impl<'a> Verifier<'a> {
    pub fn new(corpus: &'a Corpus, root_uri: &str) -> Result<Verifier<'a>, regex::Error> {
        Ok(Verifier {
            corpus,
            scanner: LinkScanner::new()?,
            root_uri: root_uri.to_string(),
        })
    }

    pub fn run(&self, categories: &[String], reporter: &mut dyn Reporter) -> VerifyReport {
        let mut report = VerifyReport::default();

        for doc in self.corpus.all_documents(categories) {
            let content = match fs::read_to_string(&doc.path) {
                Ok(content) => content,
                Err(e) => {
                    reporter.io_failed(&doc.path, &e);
                    continue;
                }
            };

            for link in self.scanner.extract(&content) {
                if link.kind() != LinkKind::Internal {
                    continue;
                }
                report.total_links += 1;

                let Some(resolved) = self.resolve(doc.dir(), &link.target) else {
                    continue;
                };
                if !resolved.exists() {
                    report.broken_links.push(BrokenLink {
                        source: doc.path.display().to_string(),
                        label: link.label,
                        target: link.target,
                        resolved: resolved.display().to_string(),
                    });
                }
            }
        }

        report
    }

    /// Where `target` points when read from a document in `dir`, with `.`
    /// and `..` already applied. `None` for a bare anchor with nothing to
    /// resolve.
    fn resolve(&self, dir: &Path, target: &str) -> Option<PathBuf> {
        let (path, _) = split_anchor(target);
        if path.is_empty() {
            return None;
        }
        let joined = if let Some(rest) = strip_root_uri(path, &self.root_uri) {
            self.corpus.root().join(rest)
        } else if let Some(local) = file_uri_path(path) {
            local
        } else {
            dir.join(path)
        };
        Some(normalize(&joined))
    }
}
