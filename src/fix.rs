use crate::config::Config;
use crate::corpus::{Corpus, Document};
use crate::index::NameIndex;
use crate::links::{
    file_name, normalize, relative_path, split_anchor, strip_root_uri, LinkKind, LinkScanner,
};
use crate::report::Reporter;
use serde::Serialize;
use std::fs;

#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct FixSummary {
    pub files_scanned: usize,
    pub files_changed: usize,
    pub links_fixed: usize,
}

/// Rewrites internal links that no longer resolve, using the name index.
pub struct Fixer<'a> {
    corpus: &'a Corpus,
    index: &'a NameIndex,
    scanner: LinkScanner,
    root_uri: String,
    report_misses: bool,
    dry_run: bool,
}

impl<'a> Fixer<'a> {
    pub fn new(
        corpus: &'a Corpus,
        index: &'a NameIndex,
        config: &Config,
        dry_run: bool,
    ) -> Result<Fixer<'a>, regex::Error> {
        Ok(Fixer {
            corpus,
            index,
            scanner: LinkScanner::new()?,
            root_uri: config.root_uri.clone(),
            report_misses: config.report_misses,
            dry_run,
        })
    }

    /// Fix every document under `categories`. Read and write failures are
    /// reported and skipped.
    pub fn run(&self, categories: &[String], reporter: &mut dyn Reporter) -> FixSummary {
        let mut summary = FixSummary::default();

        for doc in self.corpus.all_documents(categories) {
            let content = match fs::read_to_string(&doc.path) {
                Ok(content) => content,
                Err(e) => {
                    reporter.io_failed(&doc.path, &e);
                    continue;
                }
            };
            summary.files_scanned += 1;

            let (fixed, count) = self.fix_content(&doc, &content, reporter);
            if fixed == content {
                continue;
            }

            if !self.dry_run {
                if let Err(e) = fs::write(&doc.path, &fixed) {
                    reporter.io_failed(&doc.path, &e);
                    continue;
                }
            }
            summary.files_changed += 1;
            summary.links_fixed += count;
        }

        summary
    }

    /// Returns the rewritten content and the number of targets replaced.
    ///
    /// Only the target span of each matched link is replaced, so the same
    /// text elsewhere in the document is left alone.
    pub fn fix_content(
        &self,
        doc: &Document,
        content: &str,
        reporter: &mut dyn Reporter,
    ) -> (String, usize) {
        let mut out = String::with_capacity(content.len());
        let mut last = 0;
        let mut count = 0;

        for link in self.scanner.extract(content) {
            if link.kind() != LinkKind::Internal {
                continue;
            }

            let (path, anchor) = split_anchor(&link.target);
            if path.is_empty() {
                continue;
            }

            // Healthy as written
            if normalize(&doc.dir().join(path)).is_file() {
                continue;
            }

            let clean = strip_root_uri(path, &self.root_uri).unwrap_or(path);
            let name = file_name(clean);
            if name.is_empty() {
                continue;
            }

            let Some(location) = self.index.lookup(name) else {
                if self.report_misses {
                    reporter.lookup_missed(&doc.path, &link.target);
                }
                continue;
            };

            let correct = self.corpus.root().join(location);
            let Some(relative) = relative_path(doc.dir(), &correct) else {
                reporter.relpath_failed(doc.dir(), &correct);
                continue;
            };

            let new_target = match anchor {
                Some(anchor) if !anchor.is_empty() => format!("{}#{}", relative, anchor),
                _ => relative,
            };
            if new_target == link.target {
                continue;
            }

            out.push_str(&content[last..link.target_span.start]);
            out.push_str(&new_target);
            last = link.target_span.end;
            count += 1;

            reporter.fixed(&doc.path, &link.target, &new_target);
        }

        out.push_str(&content[last..]);
        (out, count)
    }
}
