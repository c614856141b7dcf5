pub mod credentials;
pub mod loaders;
pub mod quiz;

pub use credentials::Credentials;
pub use loaders::{load_quiz_file, load_quiz_files, QuizFile};
pub use quiz::{Question, QuestionKind, QuizDocument};
