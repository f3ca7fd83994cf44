pub mod championship;
pub mod numeric;
pub mod scoring;
