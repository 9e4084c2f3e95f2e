pub mod identifier;
pub mod test_utils;

pub use identifier::IdentifierAllocator;
