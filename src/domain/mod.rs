// Domain layer: models, value types and ports (interfaces). No HTTP or IO here.

pub mod elevator_code;
pub mod model;
pub mod ports;
pub mod qr;
pub mod token;
