//! Persistent step cache
//!
//! Remembers which provisioning steps already succeeded for a target so
//! reruns skip them. One JSON record per target, stored next to (not
//! inside) the target directory.
//!
//! # Invalidation
//!
//! The cache is advisory. A hit only counts when the real effect still
//! holds (the file exists and is current, the directory exists), and a
//! record whose target directory has disappeared is discarded on load.
//!
//! | Record | Target dir | Result of `load` |
//! |--------|------------|------------------|
//! | absent | any | empty cache |
//! | present | present | stored entries |
//! | present | absent | record deleted, empty cache |
//! | unreadable | present | empty cache (warning) |

mod step_cache;

pub use step_cache::{StepCache, StepKey, RECORD_VERSION};
