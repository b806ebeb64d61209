// Adapters layer: concrete implementations for external systems (tabular files).

pub mod tabular;
