// Domain layer: project entity graph, usage report and the ports the engine talks to.

pub mod model;
pub mod ports;
