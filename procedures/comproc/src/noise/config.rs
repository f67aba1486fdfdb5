use bevy::prelude::*;
use noise::{NoiseFn, Seedable};
use std::fmt::Debug;

#[derive(Clone)]
pub struct NoiseConfig<const D: usize, N: NoiseFn<f64, D> + Seedable> {
	pub noise: N,
	pub frequency: f32,
}

impl<const D: usize, N: NoiseFn<f64, D> + Seedable> Debug for NoiseConfig<D, N> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"NoiseConfig<{}, {}> {{ frequency: {}, seed: {} }}",
			D,
			std::any::type_name::<N>(),
			self.frequency,
			self.noise.seed()
		)
	}
}

impl<const D: usize, N: NoiseFn<f64, D> + Seedable + Default> Default for NoiseConfig<D, N> {
	fn default() -> Self {
		Self { frequency: 0.1, noise: N::default() }
	}
}

impl<const D: usize, N: NoiseFn<f64, D> + Seedable> PartialEq for NoiseConfig<D, N> {
	fn eq(&self, other: &Self) -> bool {
		self.frequency == other.frequency && self.noise.seed() == other.noise.seed()
	}
}

impl<const D: usize, N: NoiseFn<f64, D> + Seedable> NoiseConfig<D, N> {
	pub fn with_frequency(mut self, frequency: f32) -> Self {
		self.frequency = frequency;
		self
	}

	pub fn with_seed(mut self, seed: u32) -> Self {
		self.noise = self.noise.set_seed(seed);
		self
	}
}

impl<N: NoiseFn<f64, 2> + Seedable> NoiseConfig<2, N> {
	/// Gets on vec2 only applies frequency
	pub fn vec2_freqo(&self, position: Vec2) -> f64 {
		self.noise.get([
			position.x as f64 * self.frequency as f64,
			position.y as f64 * self.frequency as f64,
		])
	}

	/// Gets on vec2 only applies frequency to obtain a value on the unit interval
	pub fn vec2_on_unit(&self, position: Vec2) -> f64 {
		let noise = self.vec2_freqo(position);
		(noise * 0.5 + 0.5).clamp(0.0, 1.0)
	}
}
