// src/mirror/mod.rs
// =============================================================================
// The on-disk side of the mirror.
//
// Submodules:
// - path: URL -> local file path under the mirror root
// - storage: the filesystem capability (ensure dir, write, read back)
// =============================================================================

mod path;
mod storage;

pub use path::{map_url_to_path, INDEX_FILE};
pub use storage::{LocalStorage, Storage};
