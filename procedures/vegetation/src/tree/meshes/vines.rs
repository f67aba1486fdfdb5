use crate::atlas::AtlasCell;
use bevy::prelude::*;
use render_item::{MeshAssembler, Pass, Vertex};

/// A ribbon hanging below a branch, one pair of vertices per underside point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VineStrip {
	/// How far the lower edge hangs below the branch.
	pub drop: f32,
}

impl Default for VineStrip {
	fn default() -> Self {
		Self { drop: 3.5 }
	}
}

impl VineStrip {
	/// Emits the ribbon into the alpha pass and returns the number of vertices pushed.
	pub fn emit(&self, assembler: &mut MeshAssembler, transform: Mat4, points: &[Vec3]) -> u32 {
		if points.len() < 2 {
			log::debug!("Skipping vine with {} points", points.len());
			return 0;
		}

		let cell = AtlasCell::Vine.uv_rect();
		let first = assembler.next_index();
		for (k, &point) in points.iter().enumerate() {
			let v = k as f32;
			assembler.push_vertex(Vertex::new(point, Vec3::Z, Vec2::new(cell.max.x, v), transform));
			assembler.push_vertex(Vertex::new(
				point - Vec3::Z * self.drop,
				Vec3::Z,
				Vec2::new(cell.min.x, v),
				transform,
			));
		}

		for k in 0..points.len() as u32 - 1 {
			let (top, bottom) = (first + 2 * k, first + 2 * k + 1);
			let (next_top, next_bottom) = (top + 2, bottom + 2);
			assembler.emit_quad(Pass::Alpha, top, bottom, next_bottom, next_top);
		}

		assembler.next_index() - first
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_ribbon_pairs_and_quads() {
		let points: Vec<Vec3> = (0..9).map(|i| Vec3::new(i as f32, 0.0, 5.0)).collect();
		let mut assembler = MeshAssembler::new();
		let pushed = VineStrip::default().emit(&mut assembler, Mat4::IDENTITY, &points);

		assert_eq!(pushed, 18);
		assert_eq!(assembler.triangle_count(Pass::Alpha), 16);
		assert!(assembler.indices(Pass::Opaque).is_empty());

		let vertices = assembler.vertices();
		assert_eq!(vertices[2].position.truncate(), Vec3::new(1.0, 0.0, 5.0));
		assert_eq!(vertices[3].position.truncate(), Vec3::new(1.0, 0.0, 1.5));
		assert_eq!(vertices[3].uv, Vec2::new(0.5, 1.0));
		assert_eq!(vertices[2].uv, Vec2::new(0.75, 1.0));
	}

	#[test]
	fn test_quads_share_the_diagonal() {
		let points = [Vec3::ZERO, Vec3::X];
		let mut assembler = MeshAssembler::new();
		VineStrip::default().emit(&mut assembler, Mat4::IDENTITY, &points);
		assert_eq!(assembler.indices(Pass::Alpha), &[0, 1, 3, 0, 3, 2]);
	}

	#[test]
	fn test_single_point_emits_nothing() {
		let mut assembler = MeshAssembler::new();
		let pushed = VineStrip::default().emit(&mut assembler, Mat4::IDENTITY, &[Vec3::ONE]);
		assert_eq!(pushed, 0);
		assert!(assembler.is_empty());
	}
}
