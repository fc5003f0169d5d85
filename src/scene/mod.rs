pub(crate) mod controller;
pub(crate) mod lifecycle;
pub(crate) mod model;
pub(crate) mod phase;
