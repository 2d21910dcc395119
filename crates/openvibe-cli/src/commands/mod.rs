pub mod config;
pub mod detached;
pub mod tabs;
