pub mod classify;
pub mod consensus;
pub mod remap;
