use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("an edge already connects these vertices")]
    DuplicateEdge,
    #[error("an edge cannot connect a vertex to itself")]
    SelfLoop,
}
