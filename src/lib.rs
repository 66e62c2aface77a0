pub mod chat;
pub mod config;
pub mod db;
pub mod llm;
pub mod navigation;
pub mod profile;

#[cfg(feature = "desktop")]
mod commands;

/// Installs the global `tracing` subscriber. `RUST_LOG` overrides the
/// default `info` filter. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .try_init();
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use chat::prompt::build_system_prompt;
    use chat::{ChatSessionManager, ChatWidget};
    use config::{AppConfig, CredentialChain, EnvCredential};
    use db::Database;
    use llm::gemini::GeminiBackend;
    use llm::SessionConfig;
    use navigation::navigator::Navigator;
    use navigation::SectionId;
    use profile::Profile;
    use std::sync::Arc;
    use tauri::Manager;

    init_tracing();

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let app_dir = app.path().app_data_dir()?;
            let database = Arc::new(Database::new(&app_dir)?);
            let config = AppConfig::load(&database);
            let profile = Profile::builtin()?;

            let credentials = CredentialChain::new()
                .with(EnvCredential::default())
                .with(Arc::clone(&database));
            let backend = GeminiBackend::with_base_url(credentials, &config.gemini_base_url);
            let session_config =
                SessionConfig::new(&config.model, build_system_prompt(&profile));
            let manager = ChatSessionManager::new(backend, session_config);
            let widget = ChatWidget::new(Arc::new(manager), ChatWidget::greeting_for(&profile));

            let navigator = Navigator::new(
                SectionId::ALL.to_vec(),
                config.scroll_offset,
                config.header_height,
            );

            tracing::info!(model = %config.model, dir = %app_dir.display(), "portfolio started");
            app.manage(database);
            app.manage(widget);
            app.manage(navigator);
            app.manage(profile);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::chat::send_chat_message,
            commands::chat::get_chat_messages,
            commands::chat::is_chat_loading,
            commands::chat::reset_chat,
            commands::navigation::get_sections,
            commands::navigation::get_active_section,
            commands::navigation::update_scroll,
            commands::navigation::navigate_to_section,
            commands::profile::get_profile,
            commands::settings::get_settings,
            commands::settings::set_setting,
            commands::settings::delete_setting,
            commands::settings::get_theme,
            commands::settings::set_theme,
            commands::settings::toggle_theme,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
