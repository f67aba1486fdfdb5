pub mod noise;
pub mod random;

pub use random::{Mersenne, RandomSource};
