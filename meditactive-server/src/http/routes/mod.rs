//! Route handlers organized by resource

pub mod intervals;
pub mod root;
pub mod users;
