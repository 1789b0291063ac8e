// Domain layer: recipe schema types and ports (interfaces).

pub mod model;
pub mod ports;
