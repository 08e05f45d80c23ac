pub use crate::builder::{Limit, TreeBuilder};
pub use crate::effect::Effect;
pub use crate::error::{ConfigError, InvariantError, MemoError};
pub use crate::key::{FloatKey, IdentityKey};
#[cfg(feature = "metrics")]
pub use crate::metrics::{MetricsSnapshotProvider, TreeMetricsSnapshot};
pub use crate::observer::{NoopObserver, Observer, StorageInfo, StorageKind};
pub use crate::policy::{
    FifoStrategy, LfuStrategy, LruStrategy, NoopStrategy, Policy, Strategy,
};
pub use crate::store::{Root, StorageId};
pub use crate::traits::{CacheStrategy, Capacity};
