pub mod cli;
pub mod presenter;
pub mod settings_view;
