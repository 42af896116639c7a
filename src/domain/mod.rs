// Domain layer: the brewery record and the storage port. No HTTP or CLI types here.

pub mod model;
pub mod ports;
