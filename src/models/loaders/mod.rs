pub mod quiz_loader;

pub use quiz_loader::{load_quiz_file, load_quiz_files, parse_quiz_json, QuizFile};
