pub mod bindings;

pub use bindings::{parse_key, speed_label, Action};
