//! Person records extracted from the seed SQL files.
//!
//! Records look like `('Name', 'Original' | NULL, birth, death ...)`. The
//! extraction is best-effort: anything that does not match the pattern is
//! ignored rather than reported.

pub mod discovery;

use anyhow::{bail, Result};
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

pub use discovery::discover_corpora;

/// One person waiting for a photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonDescriptor {
    pub display_name: String,
    pub original_name: Option<String>,
}

impl PersonDescriptor {
    pub fn new(display_name: impl Into<String>, original_name: Option<&str>) -> Self {
        Self {
            display_name: display_name.into(),
            original_name: original_name.map(|s| s.to_string()),
        }
    }
}

fn record_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"\(\s*'([^']+(?:''[^']*)*)',",       // display name
            r"\s*(?:'([^']+(?:''[^']*)*)'|NULL),", // original name
            r"\s*(-?\d+),",                        // birth year
            r"\s*(-?\d+)\s*[,)]",                  // death year
        ))
        .unwrap()
    })
}

fn unescape(field: &str) -> String {
    field.replace("''", "'")
}

/// All records found in one corpus, in document order.
pub fn extract_records(content: &str) -> Vec<PersonDescriptor> {
    record_re()
        .captures_iter(content)
        .filter_map(|caps| {
            let display_name = unescape(caps.get(1)?.as_str());
            let original_name = caps
                .get(2)
                .map(|m| unescape(m.as_str()))
                .filter(|s| !s.trim().is_empty());

            Some(PersonDescriptor {
                display_name,
                original_name,
            })
        })
        .collect()
}

/// Read every corpus in `directory` (minus `excluded` file names) and
/// return the descriptors, first occurrence of each display name winning.
///
/// Fails only when the directory itself cannot be read.
pub fn extract_persons(directory: &Path, excluded: &[String]) -> Result<Vec<PersonDescriptor>> {
    if !directory.is_dir() {
        bail!("Corpus directory {} is not readable", directory.display());
    }

    let corpora = discover_corpora(directory, excluded)?;
    info!("Reading {} corpus files from {}", corpora.len(), directory.display());

    let mut seen = HashSet::new();
    let mut persons = Vec::new();

    for path in &corpora {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Skipping unreadable corpus {}: {}", path.display(), e);
                continue;
            }
        };

        let records = extract_records(&content);
        debug!("{}: {} records", path.display(), records.len());

        for record in records {
            if seen.insert(record.display_name.clone()) {
                persons.push(record);
            } else {
                debug!("Duplicate record for '{}' ignored", record.display_name);
            }
        }
    }

    Ok(persons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_extract_insert_rows() {
        let sql = r#"
INSERT INTO persons (name, name_original, birth_year, death_year, main_photo_url) VALUES
('Хеопс', 'Khufu', -2589, -2566, '/uploads/seed/default.jpg'),
('Жанна д''Арк', 'Jeanne d''Arc', 1412, 1431, '/uploads/seed/default.jpg'),
('Имхотеп', NULL, -2650, -2600, '/uploads/seed/default.jpg');
"#;
        let records = extract_records(sql);

        assert_eq!(
            records,
            vec![
                PersonDescriptor::new("Хеопс", Some("Khufu")),
                PersonDescriptor::new("Жанна д'Арк", Some("Jeanne d'Arc")),
                PersonDescriptor::new("Имхотеп", None),
            ]
        );
    }

    #[test]
    fn test_record_closed_after_death_year() {
        let records = extract_records("VALUES ('Иван', NULL, -100, -50);");
        assert_eq!(records, vec![PersonDescriptor::new("Иван", None)]);
    }

    #[test]
    fn test_non_matching_content_yields_nothing() {
        assert!(extract_records("CREATE TABLE persons (id UUID PRIMARY KEY);").is_empty());
        assert!(extract_records("('Name', NULL, 'not a year', 12)").is_empty());
        assert!(extract_records("").is_empty());
    }

    #[test]
    fn test_blank_original_is_absent() {
        let records = extract_records("('Гомер', ' ', -800, -701,");
        assert_eq!(records, vec![PersonDescriptor::new("Гомер", None)]);
    }

    #[test]
    fn test_extract_persons_skips_output_and_duplicates() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("02-ancient.sql"),
            "('Хеопс', 'Khufu', -2589, -2566, 'x'),\n('Нефертити', NULL, -1370, -1330, 'x');",
        )
        .unwrap();
        fs::write(
            dir.path().join("03-medieval.sql"),
            "('Хеопс', 'Khufu', -2589, -2566, 'x'),\n('Карл Великий', 'Charlemagne', 742, 814, 'x');",
        )
        .unwrap();
        fs::write(
            dir.path().join("05-photo-updates.sql"),
            "-- ('Призрак', NULL, 1, 2, 'x')",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "('Текст', NULL, 1, 2,").unwrap();

        let excluded = vec!["05-photo-updates.sql".to_string()];
        let persons = extract_persons(dir.path(), &excluded).unwrap();
        let names: Vec<&str> = persons.iter().map(|p| p.display_name.as_str()).collect();

        assert_eq!(names, vec!["Хеопс", "Нефертити", "Карл Великий"]);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("init-db");
        assert!(extract_persons(&missing, &[]).is_err());
    }

    #[test]
    fn test_invalid_utf8_corpus_is_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("01-bad.sql"), [0xff, 0xfe, 0x00]).unwrap();
        fs::write(dir.path().join("02-good.sql"), "('Иван', NULL, -100, -50)").unwrap();

        let persons = extract_persons(dir.path(), &[]).unwrap();
        assert_eq!(persons, vec![PersonDescriptor::new("Иван", None)]);
    }
}
