//! Unicode data: block ranges and East-Asian width classification.

pub mod blocks;
pub mod width;
