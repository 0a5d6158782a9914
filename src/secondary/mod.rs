//! Secondary role: idempotent, ordered replica storage and its RPC handler.

pub mod handler;
pub mod storage;

pub use handler::SecondaryHandler;
pub use storage::OrderedStorage;
