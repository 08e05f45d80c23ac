pub(crate) mod context;
pub mod leaf;
pub(crate) mod node;
pub mod root;
pub(crate) mod root_leaf;
pub mod table;

pub use leaf::LeafStorage;
pub use node::{ParentPath, StorageId};
pub use root::Root;
pub use table::Table;
