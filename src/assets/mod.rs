//! Media asset handles shared by timeline members.

pub mod media_asset;
