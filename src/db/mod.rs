pub mod models;

use crate::config::CredentialSource;
use models::Theme;
use rusqlite::{params, Connection, Result};
use std::sync::Mutex;

pub const API_KEY_SETTING: &str = "gemini_api_key";
const THEME_SETTING: &str = "theme";

pub struct Database {
    pub conn: Mutex<Connection>,
}

impl Database {
    pub fn new(app_dir: &std::path::Path) -> Result<Self> {
        std::fs::create_dir_all(app_dir).ok();
        let db_path = app_dir.join("portfolio.db");
        let conn = Connection::open(db_path)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A panic while holding the lock leaves the connection itself usable.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    // ── Settings ──

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn();
        let result = conn.query_row(
            "SELECT value FROM settings WHERE key = ?1",
            params![key],
            |row| row.get(0),
        );
        match result {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        tracing::debug!(key, "setting stored");
        Ok(())
    }

    pub fn delete_setting(&self, key: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(())
    }

    // ── Theme ──

    /// Stored theme; anything missing or unrecognised reads as light.
    pub fn theme(&self) -> Result<Theme> {
        Ok(self
            .get_setting(THEME_SETTING)?
            .and_then(|v| v.parse().ok())
            .unwrap_or_default())
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.set_setting(THEME_SETTING, theme.as_str())
    }

    pub fn toggle_theme(&self) -> Result<Theme> {
        let next = self.theme()?.toggle();
        self.set_theme(next)?;
        Ok(next)
    }
}

impl CredentialSource for Database {
    fn resolve(&self) -> Option<String> {
        match self.get_setting(API_KEY_SETTING) {
            Ok(value) => value.filter(|v| !v.trim().is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read API key setting");
                None
            }
        }
    }

    fn describe(&self) -> String {
        format!("setting {API_KEY_SETTING}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path()).unwrap();
        (dir, db)
    }

    #[test]
    fn test_settings_roundtrip_and_delete() {
        let (_dir, db) = open();
        assert_eq!(db.get_setting("gemini_model").unwrap(), None);
        db.set_setting("gemini_model", "a").unwrap();
        db.set_setting("gemini_model", "b").unwrap();
        assert_eq!(db.get_setting("gemini_model").unwrap().as_deref(), Some("b"));
        db.delete_setting("gemini_model").unwrap();
        assert_eq!(db.get_setting("gemini_model").unwrap(), None);
    }

    #[test]
    fn test_theme_defaults_to_light_and_toggles() {
        let (_dir, db) = open();
        assert_eq!(db.theme().unwrap(), Theme::Light);
        assert_eq!(db.toggle_theme().unwrap(), Theme::Dark);
        assert_eq!(db.get_setting("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(db.toggle_theme().unwrap(), Theme::Light);
    }

    #[test]
    fn test_invalid_stored_theme_reads_as_light() {
        let (_dir, db) = open();
        db.set_setting("theme", "sepia").unwrap();
        assert_eq!(db.theme().unwrap(), Theme::Light);
    }

    #[test]
    fn test_theme_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        Database::new(dir.path())
            .unwrap()
            .set_theme(Theme::Dark)
            .unwrap();
        let reopened = Database::new(dir.path()).unwrap();
        assert_eq!(reopened.theme().unwrap(), Theme::Dark);
    }

    #[test]
    fn test_api_key_credential() {
        let (_dir, db) = open();
        assert_eq!(db.resolve(), None);
        db.set_setting(API_KEY_SETTING, " ").unwrap();
        assert_eq!(db.resolve(), None);
        db.set_setting(API_KEY_SETTING, "secret").unwrap();
        assert_eq!(db.resolve().as_deref(), Some("secret"));
    }
}
