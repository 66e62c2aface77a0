pub mod chat;
pub mod navigation;
pub mod profile;
pub mod settings;
