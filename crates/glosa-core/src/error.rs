use glosa_types::NodeAddress;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("No node at {0}")]
    InvalidAddress(NodeAddress),

    #[error("Rows {position}..{position}+{count} out of range, parent has {len} children")]
    OutOfRange {
        position: usize,
        count: usize,
        len: usize,
    },

    #[error("Cannot move {node} under its own descendant {target}")]
    CyclicMove {
        node: NodeAddress,
        target: NodeAddress,
    },

    #[error("{0} is not a main word")]
    NotMainWord(NodeAddress),

    #[error("Top-level node {0} must stay a main word")]
    MainWordKind(NodeAddress),

    #[error("Simplification stopped after {rewrites} rewrites without settling")]
    SimplificationCap { rewrites: usize },
}
