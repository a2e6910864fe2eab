pub mod config;
pub mod error;
pub mod preferences;
pub mod storage;
pub mod wishlist;
