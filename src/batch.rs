// 📂 Batch I/O - reading id lists, writing guess results and reports

use crate::identity::Sex;
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read candidate numbers, one per record.
///
/// Plain text (one id per line) and CSV both work: the first field of each
/// record is taken, trimmed, and blank records are skipped. Quotes are plain
/// characters, so a stray `"` stays inside its own record.
pub fn load_id_list(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open id list: {}", path.display()))?;

    let mut ids = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("failed to read record {} of {}", line + 1, path.display()))?;
        if let Some(field) = record.get(0) {
            if !field.is_empty() {
                ids.push(field.to_string());
            }
        }
    }

    debug!(path = %path.display(), records = ids.len(), "id list loaded");
    Ok(ids)
}

/// Write items one per line, no trailing newline.
pub fn save_lines<T: AsRef<str>>(path: &Path, items: &[T]) -> Result<()> {
    let content = items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join("\n");
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), lines = items.len(), "lines saved");
    Ok(())
}

/// Default file for saved guess results: `guess_<region>_<date>_<M|F>_<timestamp>.txt`
pub fn guess_filename(
    region_code: &str,
    birth_date_digits: &str,
    sex: Sex,
    now: NaiveDateTime,
) -> PathBuf {
    PathBuf::from(format!(
        "guess_{}_{}_{}_{}.txt",
        region_code,
        birth_date_digits,
        sex.code(),
        now.format("%Y%m%d_%H%M%S")
    ))
}

/// Write a rendered report to disk.
pub fn save_report(path: &Path, report: &str) -> Result<()> {
    fs::write(path, report).with_context(|| format!("failed to write report {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_plain_lines_skips_blanks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "11010519491231002X\n\n  123  \n\n110105199003077972\n").unwrap();

        let ids = load_id_list(file.path()).unwrap();
        assert_eq!(ids, vec!["11010519491231002X", "123", "110105199003077972"]);
    }

    #[test]
    fn test_load_csv_takes_first_column() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "11010519491231002X,张三\n110105199003077972,李四,extra\n").unwrap();

        let ids = load_id_list(file.path()).unwrap();
        assert_eq!(ids, vec!["11010519491231002X", "110105199003077972"]);
    }

    #[test]
    fn test_load_stray_quote_stays_in_one_record() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "\"123\n11010519491231002X\n110105199003077972\n").unwrap();

        let ids = load_id_list(file.path()).unwrap();
        assert_eq!(ids, vec!["\"123", "11010519491231002X", "110105199003077972"]);
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(load_id_list(Path::new("/nonexistent/id_list.txt")).is_err());
    }

    #[test]
    fn test_guess_filename() {
        let now = chrono::NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap();

        assert_eq!(
            guess_filename("110105", "19491231", Sex::Female, now),
            PathBuf::from("guess_110105_19491231_F_20240615_090507.txt")
        );
        assert_eq!(
            guess_filename("440305", "20000101", Sex::Male, now),
            PathBuf::from("guess_440305_20000101_M_20240615_090507.txt")
        );
    }

    #[test]
    fn test_save_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guess.txt");

        save_lines(&path, &["a", "b", "c"]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\nc");
    }
}
