pub mod entities;
pub mod errors;
pub mod settings;
pub mod value_objects;
