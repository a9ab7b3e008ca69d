pub mod collation;
pub mod domain;
pub mod error;
pub mod normalize;
pub mod protocol;
pub mod summary;
