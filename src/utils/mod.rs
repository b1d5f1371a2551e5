pub mod extractors;
pub mod slug;
