// Domain layer: value objects exchanged with the booking service and the port it is reached through.

pub mod model;
pub mod ports;
