mod counting;
mod error;
mod exec;
mod loader;
mod matcher;
mod memory;
mod store;

pub use counting::CountingStore;
pub use error::StoreError;
pub use loader::{DocumentIter, JsonFileLoader, Loader, NoopLoader};
pub use memory::MemoryStore;
pub use store::Store;
