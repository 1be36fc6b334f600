use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use crate::error::Result;
use crate::export::format_csv;
use crate::stats::AttemptStat;

/// Writes timestamped CSV snapshots of the statistics table.
pub struct SessionManager {
    base_dir: PathBuf,
    last_session: Option<PathBuf>,
}

impl SessionManager {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            last_session: None,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path a session started at `time` is written to.
    pub fn session_path(&self, time: DateTime<Local>) -> PathBuf {
        self.base_dir
            .join(format!("Session_{}.csv", time.format("%Y_%m_%d_%H_%M_%S")))
    }

    /// Write `stats` to a new session file, creating the directory if needed.
    ///
    /// Nothing is written for an empty table.
    pub fn save(&mut self, stats: &[AttemptStat]) -> Result<Option<PathBuf>> {
        if stats.is_empty() {
            return Ok(None);
        }

        fs::create_dir_all(&self.base_dir)?;
        let path = self.session_path(Local::now());
        fs::write(&path, format_csv(stats))?;
        info!("Saved session to {}", path.display());

        self.last_session = Some(path.clone());
        Ok(Some(path))
    }

    pub fn last_session_path(&self) -> Option<&Path> {
        self.last_session.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::CSV_HEADER;
    use crate::game::LocationId;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn create_temp_session_manager() -> (SessionManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let manager = SessionManager::new(temp_dir.path().join("sessions"));
        (manager, temp_dir)
    }

    #[test]
    fn test_new_session_manager() {
        let (manager, _temp) = create_temp_session_manager();
        assert!(manager.last_session_path().is_none());
        assert!(manager.base_dir().ends_with("sessions"));
    }

    #[test]
    fn test_session_path_format() {
        let (manager, _temp) = create_temp_session_manager();
        let time = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let path = manager.session_path(time);
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "Session_2024_03_09_07_05_01.csv"
        );
    }

    #[test]
    fn test_save_writes_csv() {
        let (mut manager, _temp) = create_temp_session_manager();
        let stats = vec![AttemptStat::new(LocationId::new("a", "a"))];

        let path = manager.save(&stats).unwrap().unwrap();
        assert!(path.exists());
        assert_eq!(manager.last_session_path(), Some(path.as_path()));

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(CSV_HEADER));
        assert!(content.contains("a,0,-,0,0,0"));
    }

    #[test]
    fn test_save_skips_empty() {
        let (mut manager, _temp) = create_temp_session_manager();
        assert!(manager.save(&[]).unwrap().is_none());
        assert!(!manager.base_dir().exists());
    }
}
