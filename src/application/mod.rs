pub mod auth;
pub mod builders;
pub mod command_renderer;
pub mod prompt;
pub mod services;
pub mod settings_editor;
pub mod url_composer;
