pub mod additives;
pub mod assets;
pub mod config;
pub mod history;
