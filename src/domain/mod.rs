// Domain layer: records, enrichment results and the ports the adapters implement.

pub mod model;
pub mod ports;
pub mod services;
