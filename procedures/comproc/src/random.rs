/// Seeded source of randomness threaded explicitly through every generator that needs it.
///
/// Implementations must be a pure function of their seed and the number of draws taken so far.
pub trait RandomSource {
	/// Next raw 32-bit output.
	fn next_u32(&mut self) -> u32;

	/// Uniform float in `[0, 1)` built from the top 24 bits of the next output.
	fn next_uniform(&mut self) -> f32 {
		(self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
	}

	/// Integer in `[0, n)`; always 0 when `n` is 0.
	fn next_bounded(&mut self, n: u32) -> u32 {
		match n {
			0 => 0,
			n => self.next_u32() % n,
		}
	}
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
	fn next_u32(&mut self) -> u32 {
		(**self).next_u32()
	}
}

const N: usize = 624;
const M: usize = 397;
const MATRIX_A: u32 = 0x9908_b0df;
const UPPER_MASK: u32 = 0x8000_0000;
const LOWER_MASK: u32 = 0x7fff_ffff;
const TEMPERING_MASK_B: u32 = 0x9d2c_5680;
const TEMPERING_MASK_C: u32 = 0xefc6_0000;

/// 32-bit Mersenne twister (MT19937).
#[derive(Clone)]
pub struct Mersenne {
	state: Box<[u32; N]>,
	index: usize,
}

impl std::fmt::Debug for Mersenne {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Mersenne").field("index", &self.index).finish_non_exhaustive()
	}
}

impl Mersenne {
	pub fn new(seed: u32) -> Self {
		log::trace!("Seeding Mersenne twister with {}", seed);

		let mut state = Box::new([0u32; N]);
		state[0] = seed;
		for i in 1..N {
			let previous = state[i - 1];
			state[i] =
				1_812_433_253u32.wrapping_mul(previous ^ (previous >> 30)).wrapping_add(i as u32);
		}

		// force a twist on the first draw
		Self { state, index: N }
	}

	fn twist(&mut self) {
		for kk in 0..N {
			let y = (self.state[kk] & UPPER_MASK) | (self.state[(kk + 1) % N] & LOWER_MASK);
			let mag = if y & 1 == 0 { 0 } else { MATRIX_A };
			self.state[kk] = self.state[(kk + M) % N] ^ (y >> 1) ^ mag;
		}
		self.index = 0;
	}
}

impl RandomSource for Mersenne {
	fn next_u32(&mut self) -> u32 {
		if self.index >= N {
			self.twist();
		}

		let mut y = self.state[self.index];
		self.index += 1;

		y ^= y >> 11;
		y ^= (y << 7) & TEMPERING_MASK_B;
		y ^= (y << 15) & TEMPERING_MASK_C;
		y ^= y >> 18;
		y
	}
}
