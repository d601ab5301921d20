// Domain layer: article models, ports and the scoring/extraction services.
// Nothing here touches the network or the filesystem.

pub mod model;
pub mod ports;

pub mod services;
