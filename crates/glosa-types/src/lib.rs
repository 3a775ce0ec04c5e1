pub mod address;
pub mod types;

pub use address::NodeAddress;
pub use types::{AppEvent, DictionaryQuery, TreeEvent};
