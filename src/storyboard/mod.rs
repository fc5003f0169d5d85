pub(crate) mod config;
pub(crate) mod debug;
pub(crate) mod manager;
