pub mod dictionary;
pub mod error;
pub mod lookup;
pub mod node;
pub mod preprocess;
pub mod scan;
pub mod simplify;
pub mod store;

pub use error::TreeError;
pub use node::{Attribute, Attributes, Gender, NodeKind, TreeNode, WordClass, WordDetails};
pub use store::TreeStore;
