//! Pool configuration resolution
//!
//! Pool documents live side by side in one directory and are addressed by
//! file stem. Resolution proceeds in four steps:
//!
//! 1. **Load** - read the document and check it against its field table
//! 2. **Normalize** - sizes to gigabytes, durations to seconds, aliases folded
//! 3. **Flatten** - merge in every parent, depth first, in declared order
//! 4. **Finalize** - fill defaults and require every field to be set
//!
//! Field merge policy while flattening:
//!
//! - Scalar fields left unset by a document are taken from each parent in
//!   turn, so the last parent decides, even when it leaves them unset
//! - `artifacts` and `macros` merge key by key, the document's own keys win
//! - `scopes` are unioned

mod fields;
mod loader;
mod map;
mod pool;
mod resolver;

pub use fields::PoolFields;
pub use loader::{LoadedConfig, PoolConfigLoader};
pub use map::{PoolConfigMap, SharedFields};
pub use pool::{MachineCandidate, PoolConfiguration};
pub use resolver::{DEFAULT_MAX_DEPTH, PoolResolver};
