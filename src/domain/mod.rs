// Domain layer: core models and ports (interfaces). Data types only; no I/O.

pub mod model;
pub mod ports;
