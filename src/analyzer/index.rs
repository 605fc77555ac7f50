use std::path::{Path, PathBuf};

use dashmap::DashMap;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::extract::Extractor;
use super::record::ExtractionResult;
use crate::config::IndexConfig;
use crate::parser::SourceParser;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    pub files: usize,
    pub failed: usize,
    pub imports: usize,
    pub functions: usize,
    pub classes: usize,
    pub methods: usize,
}

#[derive(Serialize)]
struct IndexSnapshot {
    files: Vec<ExtractionResult>,
    summary: IndexSummary,
}

/// Extraction results for every JS-family file under a directory, keyed by
/// path.
pub struct ProjectIndex {
    results: DashMap<String, ExtractionResult>,
}

impl ProjectIndex {
    pub fn build<P>(root: impl AsRef<Path>, config: &IndexConfig, extractor: &Extractor<P>) -> Self
    where
        P: SourceParser + Sync,
    {
        let files = find_all_source_files(root.as_ref(), config);
        debug!(count = files.len(), root = %root.as_ref().display(), "indexing");

        let results = DashMap::new();
        files.par_iter().for_each(|file_path| match extractor.extract_file(file_path) {
            Ok(result) => {
                results.insert(result.file.path.clone(), result);
            }
            Err(err) => warn!(error = %err, "skipping unreadable file"),
        });

        Self { results }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<ExtractionResult> {
        self.results.get(path).map(|e| e.value().clone())
    }

    /// All results, ordered by path.
    pub fn results(&self) -> Vec<ExtractionResult> {
        let mut out: Vec<ExtractionResult> =
            self.results.iter().map(|e| e.value().clone()).collect();
        out.sort_by(|a, b| a.file.path.cmp(&b.file.path));
        out
    }

    pub fn summary(&self) -> IndexSummary {
        self.results
            .iter()
            .fold(IndexSummary::default(), |mut acc, entry| {
                let r = entry.value();
                acc.files += 1;
                acc.failed += usize::from(!r.is_ok());
                acc.imports += r.imports.len();
                acc.functions += r.functions.len();
                acc.classes += r.classes.len();
                acc.methods += r.methods.len();
                acc
            })
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        let snapshot = IndexSnapshot {
            files: self.results(),
            summary: self.summary(),
        };
        if pretty {
            serde_json::to_string_pretty(&snapshot)
        } else {
            serde_json::to_string(&snapshot)
        }
    }
}

/// Files under `root` accepted by `config`, sorted. Excluded directories are
/// pruned, not descended into.
pub fn find_all_source_files(root: &Path, config: &IndexConfig) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !(entry.file_type().is_dir() && config.is_excluded_dir(entry.file_name()))
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && config.accepts_file(e.path()))
        .map(|e| e.into_path())
        .collect();
    out.sort();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "src/app.ts", "import { a } from './a';\nexport class App {\n  run() {}\n}\n");
        write(root, "src/a.js", "function a() {}\nmodule.exports = { a };\n");
        write(root, "src/broken.jsx", "function (");
        write(root, "src/vendor.min.js", "function skipped() {}");
        write(root, "node_modules/dep/index.js", "function dep() {}");
        write(root, "README.md", "# readme");
        dir
    }

    #[test]
    fn walk_prunes_excluded_dirs_and_suffixes() {
        let dir = project();
        let files = find_all_source_files(dir.path(), &IndexConfig::default());
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["src/a.js", "src/app.ts", "src/broken.jsx"]);
    }

    #[test]
    fn index_extracts_every_file() {
        let dir = project();
        let extractor: Extractor = Extractor::default();
        let index = ProjectIndex::build(dir.path(), &IndexConfig::default(), &extractor);

        assert_eq!(index.len(), 3);
        let summary = index.summary();
        assert_eq!(
            summary,
            IndexSummary {
                files: 3,
                failed: 1,
                imports: 1,
                functions: 1,
                classes: 1,
                methods: 1,
            }
        );

        let app = dir.path().join("src/app.ts");
        let result = index.get(&app.to_string_lossy()).expect("indexed");
        assert_eq!(result.methods[0].qualified_name, "App.run");

        let ordered: Vec<String> = index.results().into_iter().map(|r| r.file.path).collect();
        let mut sorted = ordered.clone();
        sorted.sort();
        assert_eq!(ordered, sorted);
    }

    #[test]
    fn snapshot_json_has_files_and_summary() {
        let dir = project();
        let extractor: Extractor = Extractor::default();
        let index = ProjectIndex::build(dir.path(), &IndexConfig::default(), &extractor);
        let value: serde_json::Value = serde_json::from_str(&index.to_json(false).unwrap()).unwrap();
        assert_eq!(value["files"].as_array().map(Vec::len), Some(3));
        assert_eq!(value["summary"]["failed"], 1);
    }
}
