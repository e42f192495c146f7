mod loader;

pub use loader::{LoadError, load_questions_from_json};
