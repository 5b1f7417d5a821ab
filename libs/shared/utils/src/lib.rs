pub mod clock;
pub mod extractor;
pub mod jwt;
pub mod serde_time;
pub mod test_utils;
