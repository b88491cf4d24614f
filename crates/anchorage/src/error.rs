use crate::model::Edge;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot anchor an item to itself")]
    SelfAnchor,
    #[error("item handle does not refer to an item of this layout")]
    StaleItem,
    #[error("anchor handle does not refer to a live anchor")]
    StaleAnchor,
    #[error("cannot anchor {first:?} to {second:?}: edges have different orientations")]
    UnknownAnchorPoint { first: Edge, second: Edge },
    #[error(transparent)]
    Graph(#[from] anchorage_graphlib::Error),
    #[error("invalid layout options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
