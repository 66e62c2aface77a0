use crate::config::mask_secret;
use crate::db::models::Theme;
use crate::db::Database;
use std::collections::HashMap;
use std::sync::Arc;
use tauri::State;

const SETTING_KEYS: &[&str] = &[
    "gemini_api_key",
    "gemini_base_url",
    "gemini_model",
    "scroll_offset",
    "header_height",
    "theme",
];

#[tauri::command]
pub fn get_settings(db: State<'_, Arc<Database>>) -> Result<HashMap<String, String>, String> {
    let mut map = HashMap::new();
    for key in SETTING_KEYS {
        if let Some(value) = db.get_setting(key).map_err(|e| e.to_string())? {
            // Mask API keys for display
            if key.ends_with("_api_key") {
                map.insert(key.to_string(), mask_secret(&value));
            } else {
                map.insert(key.to_string(), value);
            }
        }
    }
    Ok(map)
}

#[tauri::command]
pub fn set_setting(db: State<'_, Arc<Database>>, key: String, value: String) -> Result<(), String> {
    if !SETTING_KEYS.contains(&key.as_str()) {
        return Err(format!("Unknown setting key: {}", key));
    }
    if key == "theme" {
        let theme = value.parse::<Theme>().map_err(|e| e.to_string())?;
        return db.set_theme(theme).map_err(|e| e.to_string());
    }
    db.set_setting(&key, &value).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn delete_setting(db: State<'_, Arc<Database>>, key: String) -> Result<(), String> {
    if !SETTING_KEYS.contains(&key.as_str()) {
        return Err(format!("Unknown setting key: {}", key));
    }
    db.delete_setting(&key).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_theme(db: State<'_, Arc<Database>>) -> Result<Theme, String> {
    db.theme().map_err(|e| e.to_string())
}

#[tauri::command]
pub fn set_theme(db: State<'_, Arc<Database>>, theme: Theme) -> Result<(), String> {
    db.set_theme(theme).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn toggle_theme(db: State<'_, Arc<Database>>) -> Result<Theme, String> {
    db.toggle_theme().map_err(|e| e.to_string())
}
