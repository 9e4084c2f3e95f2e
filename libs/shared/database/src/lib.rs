pub mod error;
pub mod file;
pub mod memory;
pub mod store;
pub mod supabase;

pub use error::StoreError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use store::{load_records, save_records, store_from_config, RecordStore};
pub use supabase::SupabaseClient;
