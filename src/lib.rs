pub mod adapters;
pub mod driver;
pub mod model;
pub mod storage;
pub mod util;

pub use driver::StorageDriver;
pub use model::{fs::FSError, visibility::Visibility};
pub use storage::StorageAdapter;
