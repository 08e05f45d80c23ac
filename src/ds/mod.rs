//! Collections the strategies are built from.
//!
//! - [`SlotArena`]: generational slot storage, the backing of every list.
//! - [`LinkedList`]: doubly linked list with stable node handles.
//! - [`Bucket`] / [`Single`]: the bucket capability and its one-key form.
//! - [`MultiKeyQueue`]: list of buckets with a key → node index.
//! - [`SingleKeyQueue`]: one key per bucket; hash map plus linked list.

pub mod bucket;
pub mod linked_list;
pub mod multi_key_queue;
pub mod single_key_queue;
pub mod slot_arena;

pub use bucket::{Bucket, Single};
pub use linked_list::LinkedList;
pub use multi_key_queue::MultiKeyQueue;
pub use single_key_queue::SingleKeyQueue;
pub use slot_arena::{SlotArena, SlotId};
