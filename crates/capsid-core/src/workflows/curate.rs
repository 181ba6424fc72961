use crate::core::models::entry::Entry;
use crate::engine::config::ConfigError;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, instrument};

pub const DEFAULT_MIN_LENGTH: u32 = 100;
pub const DEFAULT_MAX_LENGTH: u32 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurationSettings {
    pub min_length: u32,
    pub max_length: u32,
}

impl Default for CurationSettings {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CurationReport {
    pub input: usize,
    pub duplicates: usize,
    pub too_short: usize,
    pub too_long: usize,
    /// Kept entries that carry no length.
    pub without_length: usize,
    pub kept: usize,
}

/// Drops entries whose length falls outside `[min_length, max_length]`,
/// then repeated identifiers among the survivors (keeping the first).
/// Entries without a length are kept.
#[instrument(skip_all, name = "curation_workflow")]
pub fn run(
    entries: Vec<Entry>,
    settings: &CurationSettings,
) -> Result<(Vec<Entry>, CurationReport), ConfigError> {
    if settings.min_length > settings.max_length {
        return Err(ConfigError::InvalidParameter {
            parameter: "length_range",
            reason: format!(
                "minimum length {} exceeds maximum {}",
                settings.min_length, settings.max_length
            ),
        });
    }

    let mut report = CurationReport {
        input: entries.len(),
        ..CurationReport::default()
    };
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(entries.len());

    for entry in entries {
        match entry.length {
            Some(length) if length < settings.min_length => {
                report.too_short += 1;
                continue;
            }
            Some(length) if length > settings.max_length => {
                report.too_long += 1;
                continue;
            }
            _ => {}
        }
        if !seen.insert(entry.id.clone()) {
            report.duplicates += 1;
            continue;
        }
        if entry.length.is_none() {
            report.without_length += 1;
        }
        kept.push(entry);
    }
    report.kept = kept.len();

    info!(
        input = report.input,
        kept = report.kept,
        duplicates = report.duplicates,
        "Curation finished."
    );
    Ok((kept, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_by_length_and_keeps_first_duplicate() {
        let entries = vec![
            Entry::new("A").with_length(99),
            Entry::new("B").with_length(100),
            Entry::new("B").with_length(500).with_protein_name("second"),
            Entry::new("C").with_length(2000),
            Entry::new("D").with_length(2001),
            Entry::new("E"),
        ];
        let (kept, report) = run(entries, &CurationSettings::default()).unwrap();
        let ids: Vec<&str> = kept.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "C", "E"]);
        assert_eq!(kept[0].protein_name, "");
        assert_eq!(
            report,
            CurationReport {
                input: 6,
                duplicates: 1,
                too_short: 1,
                too_long: 1,
                without_length: 1,
                kept: 3,
            }
        );
    }

    #[test]
    fn out_of_range_record_does_not_shadow_a_valid_duplicate() {
        let entries = vec![
            Entry::new("A").with_length(50),
            Entry::new("A").with_length(300),
        ];
        let (kept, report) = run(entries, &CurationSettings::default()).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].length, Some(300));
        assert_eq!(
            report,
            CurationReport {
                input: 2,
                duplicates: 0,
                too_short: 1,
                too_long: 0,
                without_length: 0,
                kept: 1,
            }
        );
    }

    #[test]
    fn inverted_range_is_rejected() {
        let settings = CurationSettings {
            min_length: 10,
            max_length: 5,
        };
        assert!(run(Vec::new(), &settings).is_err());
    }
}
