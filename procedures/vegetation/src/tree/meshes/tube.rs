use crate::atlas::AtlasCell;
use bevy::prelude::*;
use render_item::{MeshAssembler, Pass, Vertex};
use std::f32::consts::{FRAC_PI_2, TAU};

/// Orientation of a tube: rings lie in the `across`/`up` plane and advance along `along`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TubeFrame {
	pub across: Vec3,
	pub along: Vec3,
	pub up: Vec3,
}

impl TubeFrame {
	/// Upright trunk frame: rings in the ground plane, sweeping up +Z.
	pub fn vertical() -> Self {
		Self { across: Vec3::X, along: Vec3::Z, up: Vec3::Y }
	}

	/// Branch frame: the local Y-forward sweep turned `angle` radians about +Z.
	pub fn rotated_z(angle: f32) -> Self {
		let rotation = Mat3::from_rotation_z(angle);
		Self { across: rotation * Vec3::X, along: rotation * Vec3::Y, up: rotation * Vec3::Z }
	}

	pub fn is_right_handed(&self) -> bool {
		self.up.cross(self.along).dot(self.across) > 0.0
	}

	/// Unit offset from a ring center at ring angle `theta`.
	pub fn radial(&self, theta: f32) -> Vec3 {
		self.across * theta.cos() + self.up * theta.sin()
	}
}

/// One cross-section of a tube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TubeRing {
	pub center: Vec3,
	pub radius: f32,
}

/// What a sweep leaves behind for the generators that hang off it.
#[derive(Debug, Clone, PartialEq)]
pub struct TubeOutput {
	pub vertex_count: u32,
	/// Center of the closing point cap.
	pub tip: Vec3,
	/// The lowest point of every ring, in sweep order.
	pub underside: Vec<Vec3>,
}

/// Sweeps rings into a closed tube ending in a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TubeMeshBuilder {
	pub radial_steps: u32,
	pub frame: TubeFrame,
	pub transform: Mat4,
}

impl TubeMeshBuilder {
	pub fn new(radial_steps: u32, frame: TubeFrame, transform: Mat4) -> Self {
		Self { radial_steps, frame, transform }
	}

	/// Vertices in one ring; the last repeats the first angle to close the texture seam.
	pub fn ring_len(&self) -> u32 {
		self.radial_steps + 1
	}

	fn ring_angle(&self, step: u32) -> f32 {
		let step = if step == self.radial_steps { 0 } else { step };
		-FRAC_PI_2 + step as f32 * TAU / self.radial_steps as f32
	}

	/// Emits the rings and a tip vertex, joining them with quads and a closing fan.
	///
	/// All triangles go to the opaque pass.
	pub fn build(
		&self,
		assembler: &mut MeshAssembler,
		rings: &[TubeRing],
		tip: Vec3,
	) -> TubeOutput {
		let first_index = assembler.next_index();
		let Some(origin) = rings.first().map(|ring| ring.center) else {
			log::debug!("Skipping tube without rings");
			return TubeOutput { vertex_count: 0, tip, underside: Vec::new() };
		};

		let bark = AtlasCell::Bark.uv_rect();
		let mut underside = Vec::with_capacity(rings.len());

		for ring in rings {
			let v = (ring.center - origin).dot(self.frame.along);
			for step in 0..self.ring_len() {
				let normal = self.frame.radial(self.ring_angle(step));
				let position = ring.center + normal * ring.radius;
				let u = (step as f32 / self.radial_steps as f32) * bark.max.x;
				let uv = Vec2::new(u, v);
				assembler.push_vertex(Vertex::new(position, normal, uv, self.transform));
			}
			// the ring starts at -pi/2, straight down the `up` axis
			underside.push(ring.center + self.frame.radial(self.ring_angle(0)) * ring.radius);
		}

		let tip_v = (tip - origin).dot(self.frame.along);
		let tip_index = assembler.push_vertex(Vertex::new(
			tip,
			self.frame.along,
			Vec2::new(bark.max.x, tip_v),
			self.transform,
		));

		let right_handed = self.frame.is_right_handed();
		let ring_len = self.ring_len();
		let ring_start = |ring: u32| first_index + ring * ring_len;

		for ring in 0..rings.len() as u32 - 1 {
			let (near, far) = (ring_start(ring), ring_start(ring + 1));
			for step in 0..self.radial_steps {
				let (a, b, c, d) = (near + step, near + step + 1, far + step + 1, far + step);
				if right_handed {
					assembler.emit_quad(Pass::Opaque, a, b, c, d);
				} else {
					assembler.emit_quad(Pass::Opaque, a, d, c, b);
				}
			}
		}

		let last = ring_start(rings.len() as u32 - 1);
		for step in 0..self.radial_steps {
			let (a, b) = (last + step, last + step + 1);
			if right_handed {
				assembler.emit_triangle(Pass::Opaque, a, b, tip_index);
			} else {
				assembler.emit_triangle(Pass::Opaque, b, a, tip_index);
			}
		}

		let vertex_count = assembler.next_index() - first_index;
		TubeOutput { vertex_count, tip, underside }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn straight_rings(count: usize) -> Vec<TubeRing> {
		(0..count)
			.map(|i| TubeRing { center: Vec3::new(0.0, 0.0, i as f32), radius: 1.0 })
			.collect()
	}

	fn triangle_normal(assembler: &MeshAssembler, triangle: &[u32]) -> Vec3 {
		let p = |i: u32| assembler.vertices()[i as usize].position.truncate();
		let (a, b, c) = (p(triangle[0]), p(triangle[1]), p(triangle[2]));
		(b - a).cross(c - a)
	}

	#[test]
	fn test_frames() {
		assert!(TubeFrame::vertical().is_right_handed());
		assert!(!TubeFrame::rotated_z(0.7).is_right_handed());
		let frame = TubeFrame::rotated_z(std::f32::consts::FRAC_PI_2);
		assert!(frame.along.abs_diff_eq(Vec3::NEG_X, 1e-6));
	}

	#[test]
	fn test_ring_has_closing_seam_vertex() {
		let builder = TubeMeshBuilder::new(6, TubeFrame::rotated_z(0.0), Mat4::IDENTITY);
		let mut assembler = MeshAssembler::new();
		let output = builder.build(&mut assembler, &straight_rings(1), Vec3::new(0.0, 0.0, 1.0));

		assert_eq!(builder.ring_len(), 7);
		assert_eq!(output.vertex_count, 8);

		let vertices = assembler.vertices();
		assert_eq!(vertices[0].position, vertices[6].position);
		assert_eq!(vertices[0].uv.x, 0.0);
		assert!((vertices[6].uv.x - 0.249).abs() < 1e-6);
	}

	#[test]
	fn test_quad_and_fan_counts() {
		let builder = TubeMeshBuilder::new(6, TubeFrame::vertical(), Mat4::IDENTITY);
		let mut assembler = MeshAssembler::new();
		builder.build(&mut assembler, &straight_rings(9), Vec3::new(0.0, 0.0, 9.0));

		assert_eq!(assembler.vertex_count(), 9 * 7 + 1);
		assert_eq!(assembler.triangle_count(Pass::Opaque), 8 * 6 * 2 + 6);
		assert!(assembler.indices(Pass::Alpha).is_empty());
		assert!(assembler.validate().is_ok());
	}

	#[test]
	fn test_faces_point_outward_in_both_frames() {
		for frame in [TubeFrame::vertical(), TubeFrame::rotated_z(1.1)] {
			let rings: Vec<TubeRing> = (0..3)
				.map(|i| TubeRing { center: frame.along * i as f32 * 2.0, radius: 1.0 })
				.collect();
			let builder = TubeMeshBuilder::new(6, frame, Mat4::IDENTITY);
			let mut assembler = MeshAssembler::new();
			builder.build(&mut assembler, &rings, frame.along * 5.0);

			for triangle in assembler.indices(Pass::Opaque).chunks_exact(3) {
				let centroid = triangle
					.iter()
					.map(|&i| assembler.vertices()[i as usize].position.truncate())
					.sum::<Vec3>() / 3.0;
				// radial component of the centroid relative to the sweep axis
				let outward = centroid - frame.along * centroid.dot(frame.along);
				assert!(
					triangle_normal(&assembler, triangle).dot(outward) > 0.0,
					"inward face {triangle:?} in {frame:?}"
				);
			}
		}
	}

	#[test]
	fn test_underside_points_down_the_up_axis() {
		let frame = TubeFrame::rotated_z(0.3);
		let builder = TubeMeshBuilder::new(6, frame, Mat4::IDENTITY);
		let mut assembler = MeshAssembler::new();
		let rings = [
			TubeRing { center: Vec3::ZERO, radius: 2.0 },
			TubeRing { center: frame.along, radius: 1.0 },
		];
		let output = builder.build(&mut assembler, &rings, frame.along * 2.0);

		assert_eq!(output.underside.len(), 2);
		assert!(output.underside[0].abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), 1e-6));
		assert!(output.underside[1].abs_diff_eq(frame.along - Vec3::Z, 1e-6));
	}

	#[test]
	fn test_no_rings_emits_nothing() {
		let builder = TubeMeshBuilder::new(6, TubeFrame::vertical(), Mat4::IDENTITY);
		let mut assembler = MeshAssembler::new();
		let output = builder.build(&mut assembler, &[], Vec3::Z);
		assert_eq!(output.vertex_count, 0);
		assert!(assembler.is_empty());
	}
}
