//! Exclusion lists.
//!
//! Two on-disk forms are accepted: a plain text file with one filename
//! stem per line, and a TOML file that can also exclude by prompt
//! content. A missing list is reported but not an error, since most
//! sessions simply don't have one.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::meta::LoadReport;
use crate::trial::TrialRecord;

/// Parsed exclusion criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExclusionList {
    /// Filename stems to exclude outright.
    pub files: Vec<String>,
    /// Prompts excluded on exact match.
    pub prompts: Vec<String>,
    /// Prompts excluded when they contain any of these substrings,
    /// e.g. excluding every "water swallow ..." variant on "swallow".
    pub parts_of_prompts: Vec<String>,
}

impl ExclusionList {
    /// Load a list from `path`. `.toml` files get the structured form,
    /// anything else is read as one filename stem per line. A missing
    /// file yields `None`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
        {
            let list: ExclusionList = toml::from_str(&contents)?;
            Ok(Some(list))
        } else {
            Ok(Some(ExclusionList {
                files: contents
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect(),
                ..ExclusionList::default()
            }))
        }
    }

    /// Mark matching records excluded, returning a report per newly
    /// excluded trial for the caller to log.
    pub fn apply(&self, records: &mut [TrialRecord]) -> Vec<LoadReport> {
        let mut reports = Vec::new();
        for record in records.iter_mut().filter(|r| !r.excluded) {
            if self.files.contains(&record.filename) {
                record.exclude();
                reports.push(LoadReport {
                    filename: record.filename.clone(),
                    reason: "file is in exclusion list".to_string(),
                });
                continue;
            }
            let prompt_matches = self.prompts.contains(&record.prompt)
                || self
                    .parts_of_prompts
                    .iter()
                    .any(|part| record.prompt.contains(part));
            if prompt_matches {
                record.exclude();
                reports.push(LoadReport {
                    filename: record.filename.clone(),
                    reason: format!("prompt '{}' matches exclusion list", record.prompt),
                });
            }
        }
        reports
    }
}
