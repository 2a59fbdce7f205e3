//! In-memory inverted index for query processing.
//!
//! Built once at startup from the configured source directories and shared
//! read-only across all connection workers.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

/// One matching document for a query, with its summed occurrence rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    /// Document path relative to the document root, as linked under
    /// `/static/`.
    pub document: String,
    pub rank: u64,
}

/// Conjunctive inverted index: term -> document -> occurrence count.
#[derive(Debug, Default)]
pub struct SearchIndex {
    postings: HashMap<String, HashMap<String, u64>>,
    documents: usize,
}

impl SearchIndex {
    /// Walks each source directory under `root` and indexes every readable
    /// text file. Files that are not valid UTF-8 are skipped.
    pub fn build(root: &Path, sources: &[PathBuf]) -> Result<SearchIndex> {
        let mut index = SearchIndex::default();

        for source in sources {
            let start = root.join(source);
            index
                .add_tree(root, &start)
                .with_context(|| format!("failed to index {}", start.display()))?;
        }

        info!(
            documents = index.documents,
            terms = index.postings.len(),
            "search index built"
        );
        Ok(index)
    }

    fn add_tree(&mut self, root: &Path, start: &Path) -> Result<()> {
        let mut pending = vec![start.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let entries =
                fs::read_dir(&dir).with_context(|| format!("cannot read {}", dir.display()))?;

            for entry in entries {
                let path = entry?.path();
                if path.is_dir() {
                    pending.push(path);
                    continue;
                }

                match fs::read_to_string(&path) {
                    Ok(text) => {
                        let name = document_name(root, &path);
                        self.add_document(&name, &text);
                    }
                    Err(e) => {
                        debug!(file = %path.display(), error = %e, "skipping unindexable file");
                    }
                }
            }
        }

        Ok(())
    }

    /// Tokenizes `text` on non-alphanumeric boundaries and records the
    /// lower-cased terms against `name`.
    pub fn add_document(&mut self, name: &str, text: &str) {
        let mut indexed = false;

        for token in text.split(|c: char| !c.is_alphanumeric()) {
            if token.is_empty() {
                continue;
            }

            *self
                .postings
                .entry(token.to_lowercase())
                .or_default()
                .entry(name.to_string())
                .or_insert(0) += 1;
            indexed = true;
        }

        if indexed {
            self.documents += 1;
        }
    }

    /// Returns the documents containing every term, ranked by the summed
    /// occurrence counts, descending; ties break on document name so the
    /// ordering is deterministic.
    pub fn query(&self, terms: &[String]) -> Vec<QueryResult> {
        let mut terms = terms.iter();
        let Some(first) = terms.next() else {
            return Vec::new();
        };
        let Some(mut matched) = self.postings.get(first).cloned() else {
            return Vec::new();
        };

        for term in terms {
            let Some(postings) = self.postings.get(term) else {
                return Vec::new();
            };
            matched = matched
                .into_iter()
                .filter_map(|(doc, rank)| postings.get(&doc).map(|count| (doc, rank + count)))
                .collect();
            if matched.is_empty() {
                return Vec::new();
            }
        }

        let mut results: Vec<QueryResult> = matched
            .into_iter()
            .map(|(document, rank)| QueryResult { document, rank })
            .collect();
        results.sort_by(|a, b| b.rank.cmp(&a.rank).then_with(|| a.document.cmp(&b.document)));
        results
    }

    /// Number of documents that contributed at least one term.
    pub fn document_count(&self) -> usize {
        self.documents
    }
}

fn document_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    // URI-style separators so results link directly under /static/
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
