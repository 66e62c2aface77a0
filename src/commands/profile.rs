use crate::profile::Profile;
use tauri::State;

#[tauri::command]
pub fn get_profile(profile: State<'_, Profile>) -> Profile {
    profile.inner().clone()
}
