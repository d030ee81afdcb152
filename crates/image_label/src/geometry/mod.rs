pub mod fit;
pub mod size;
