pub mod json_span;
