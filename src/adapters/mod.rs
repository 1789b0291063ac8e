// Adapters layer: concrete implementations for external systems (raw data sources, output storage).

pub mod source;
pub mod storage;
