//! Shared helpers for Lumen: completion-flag persistence, time sources and
//! configuration path handling.

pub mod clock;
pub mod completion_store;
pub mod path_processing;

pub use clock::{Clock, ManualClock, WallClock};
pub use completion_store::{
    COMPLETION_KEY_SUFFIX, COMPLETION_PATH_ENV, CompletionStore, CompletionStoreError, InMemoryCompletionStore, JsonCompletionStore,
    completion_key, default_completion_path,
};
pub use path_processing::{config_file_path, expand_tilde, expand_tilde_path};
