pub mod folder;
pub mod tip;
