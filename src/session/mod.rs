pub mod storage;
pub mod types;

pub use storage::{autosave_path, load_autosave, save_autosave};
pub use types::Autosave;
