pub mod branch;
pub mod canopy;
pub mod trunk;
pub mod tube;
pub mod vines;
