// Domain layer: chat models, Messages API wire types and ports (interfaces).

pub mod messages;
pub mod model;
pub mod ports;
