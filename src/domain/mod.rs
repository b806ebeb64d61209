// Domain layer: core models and ports (interfaces).

pub mod constants;
pub mod model;
pub mod ports;
