pub mod entries;
pub mod session;
