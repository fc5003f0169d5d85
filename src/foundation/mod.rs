pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod observer;
pub(crate) mod props;
