use crate::index::Collision;
use colored::Colorize;
use std::io;
use std::path::Path;

/// Receives diagnostics from the fix and verify passes.
pub trait Reporter {
    fn fixed(&mut self, source: &Path, old_target: &str, new_target: &str);

    fn relpath_failed(&mut self, from_dir: &Path, target: &Path);

    fn lookup_missed(&mut self, source: &Path, target: &str);

    fn io_failed(&mut self, path: &Path, err: &io::Error);

    fn collision(&mut self, collision: &Collision);
}

/// Colored console output. Per-fix lines are dropped in quiet mode.
pub struct ConsoleReporter {
    pub quiet: bool,
}

impl Reporter for ConsoleReporter {
    fn fixed(&mut self, source: &Path, old_target: &str, new_target: &str) {
        if self.quiet {
            return;
        }
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        println!(
            "{} {}: {} -> {}",
            "Fixed in".green(),
            name.cyan(),
            old_target.dimmed(),
            new_target
        );
    }

    fn relpath_failed(&mut self, from_dir: &Path, target: &Path) {
        eprintln!(
            "{}: cannot compute relative path for {} from {}",
            "warning".yellow().bold(),
            target.display(),
            from_dir.display()
        );
    }

    fn lookup_missed(&mut self, source: &Path, target: &str) {
        eprintln!(
            "{}: no index entry for {} in {}",
            "unresolved".yellow(),
            target,
            source.display()
        );
    }

    fn io_failed(&mut self, path: &Path, err: &io::Error) {
        eprintln!("{}: {}: {}", "warning".yellow().bold(), path.display(), err);
    }

    fn collision(&mut self, collision: &Collision) {
        eprintln!(
            "{}: key {} moved from {} to {}",
            "collision".yellow().bold(),
            collision.key.cyan(),
            collision.previous,
            collision.replacement
        );
    }
}

#[cfg(test)]
pub mod recording {
    use super::{Collision, Path, Reporter};
    use std::io;
    use std::path::PathBuf;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Event {
        Fixed { old: String, new: String },
        RelpathFailed { target: PathBuf },
        LookupMissed { target: String },
        IoFailed { path: PathBuf },
        Collision { key: String },
    }

    /// Collects events for assertions.
    #[derive(Default)]
    pub struct RecordingReporter {
        pub events: Vec<Event>,
    }

    impl RecordingReporter {
        pub fn fixes(&self) -> Vec<(String, String)> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::Fixed { old, new, .. } => Some((old.clone(), new.clone())),
                    _ => None,
                })
                .collect()
        }
    }

    impl Reporter for RecordingReporter {
        fn fixed(&mut self, _source: &Path, old_target: &str, new_target: &str) {
            self.events.push(Event::Fixed {
                old: old_target.to_string(),
                new: new_target.to_string(),
            });
        }

        fn relpath_failed(&mut self, _from_dir: &Path, target: &Path) {
            self.events.push(Event::RelpathFailed {
                target: target.to_path_buf(),
            });
        }

        fn lookup_missed(&mut self, _source: &Path, target: &str) {
            self.events.push(Event::LookupMissed {
                target: target.to_string(),
            });
        }

        fn io_failed(&mut self, path: &Path, _err: &io::Error) {
            self.events.push(Event::IoFailed {
                path: path.to_path_buf(),
            });
        }

        fn collision(&mut self, collision: &Collision) {
            self.events.push(Event::Collision {
                key: collision.key.clone(),
            });
        }
    }
}
