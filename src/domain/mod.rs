// Domain layer: catalog, explorer records, payment assessment and the ports
// the handler talks through. No HTTP here.

pub mod model;
pub mod payment;
pub mod ports;
