use crate::atlas::{AtlasCell, UvRect};
use crate::tree::params::{FoliageShape, LeafLayout};
use bevy::prelude::*;
use render_item::{MeshAssembler, Pass, Vertex};

/// Foliage never hangs further than this below its anchor.
pub const GROUND_CLEARANCE: f32 = 2.0;
/// Caps smaller than this are not emitted.
pub const MIN_FOLIAGE_SIZE: f32 = 0.1;

struct CapVertex {
	position: Vec3,
	normal: Vec3,
	uv: Vec2,
}

impl CapVertex {
	fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
		Self { position, normal, uv }
	}
}

/// A shape's vertices and triangles in cap-local space, indices relative to the first vertex.
struct CapLayout {
	vertices: Vec<CapVertex>,
	triangles: Vec<[u32; 3]>,
}

/// Emits one small fixed-topology foliage mesh per anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoliageCap {
	pub shape: FoliageShape,
	/// Atlas cell the cap samples its leaves from.
	pub cell: UvRect,
}

impl FoliageCap {
	pub fn new(shape: FoliageShape, leaf_layout: LeafLayout) -> Self {
		Self { shape, cell: AtlasCell::for_leaves(leaf_layout).uv_rect() }
	}

	/// Applies the ground guard, returning `None` when the cap would be too small to emit.
	pub fn clamp_size(anchor_height: f32, fsize: f32) -> Option<f32> {
		let fsize = fsize.max(anchor_height - GROUND_CLEARANCE);
		(fsize >= MIN_FOLIAGE_SIZE).then_some(fsize)
	}

	pub fn vertex_count(shape: FoliageShape) -> u32 {
		match shape {
			FoliageShape::Panel => 8,
			FoliageShape::Sag => 9,
			FoliageShape::Shield | FoliageShape::Bowl | FoliageShape::Umbrella => 6,
		}
	}

	pub fn triangle_count(shape: FoliageShape) -> u32 {
		match shape {
			FoliageShape::Panel => 4,
			FoliageShape::Sag => 12,
			FoliageShape::Shield | FoliageShape::Bowl | FoliageShape::Umbrella => 8,
		}
	}

	/// Emits the cap at `anchor` turned `angle` radians about +Z, into the alpha pass.
	///
	/// Returns whether anything was emitted.
	pub fn emit(
		&self,
		assembler: &mut MeshAssembler,
		model: Mat4,
		anchor: Vec3,
		angle: f32,
		fsize: f32,
	) -> bool {
		// the apex height follows the requested size even when the ground guard widens the rim
		let tip = fsize / 4.0;
		let Some(fsize) = Self::clamp_size(anchor.z, fsize) else {
			log::debug!("Skipping {} cap at {} with size {}", self.shape, anchor, fsize);
			return false;
		};

		let transform = model * Mat4::from_translation(anchor) * Mat4::from_rotation_z(angle);
		let layout = self.layout(fsize, tip);

		let first = assembler.next_index();
		for vertex in layout.vertices {
			let CapVertex { position, normal, uv } = vertex;
			assembler.push_vertex(Vertex::new(position, normal, uv, transform));
		}
		for [a, b, c] in layout.triangles {
			assembler.emit_triangle(Pass::Alpha, first + a, first + b, first + c);
		}

		true
	}

	fn layout(&self, fsize: f32, tip: f32) -> CapLayout {
		match self.shape {
			FoliageShape::Panel => self.panel(fsize),
			FoliageShape::Shield => self.shield(fsize),
			FoliageShape::Sag => self.sag(fsize),
			FoliageShape::Bowl => self.bowl(fsize, -tip, false),
			FoliageShape::Umbrella => self.bowl(fsize, tip, true),
		}
	}

	/// Two quads crossing at the anchor.
	fn panel(&self, f: f32) -> CapLayout {
		let cell = &self.cell;
		let vertices = [
			(Vec3::new(0.0, -f, -f), cell.top_left()),
			(Vec3::new(-1.0, f, -f), cell.top_right()),
			(Vec3::new(-1.0, f, f), cell.bottom_right()),
			(Vec3::new(0.0, -f, f), cell.bottom_left()),
			(Vec3::new(0.0, -f, -f), cell.top_right()),
			(Vec3::new(1.0, f, -f), cell.bottom_right()),
			(Vec3::new(1.0, f, f), cell.bottom_left()),
			(Vec3::new(0.0, -f, f), cell.top_left()),
		]
		.into_iter()
		.map(|(position, uv)| CapVertex::new(position, Vec3::Z, uv))
		.collect();

		CapLayout { vertices, triangles: vec![[0, 1, 2], [0, 2, 3], [7, 6, 5], [7, 5, 4]] }
	}

	/// A diamond of four rim points around +X with an apex on either side.
	fn shield(&self, f: f32) -> CapLayout {
		let cell = &self.cell;
		let center = cell.center();
		let vertices = [
			(Vec3::new(f / 2.0, 0.0, 0.0), center),
			(Vec3::new(0.0, -f, 0.0), cell.top_left()),
			(Vec3::new(0.0, 0.0, f), cell.top_right()),
			(Vec3::new(0.0, f, 0.0), cell.bottom_right()),
			(Vec3::new(0.0, 0.0, -f), cell.bottom_left()),
			(Vec3::new(-f / 2.0, 0.0, 0.0), center),
		]
		.into_iter()
		.map(|(position, uv)| CapVertex::new(position, Vec3::Z, uv))
		.collect();

		CapLayout {
			vertices,
			triangles: vec![
				[0, 1, 2],
				[0, 2, 3],
				[0, 3, 4],
				[0, 4, 1],
				[5, 2, 1],
				[5, 3, 2],
				[5, 4, 3],
				[5, 1, 4],
			],
		}
	}

	/// A shallow cap on the diagonals with a skirt drooping to the axes.
	fn sag(&self, f: f32) -> CapLayout {
		let cell = &self.cell;
		let level1 = f * -0.4;
		let level2 = f * -1.2;
		let half = f / 2.0;

		let vertices = [
			// lowered center
			(Vec3::new(0.0, 0.0, level1 / 16.0), cell.center()),
			// inner ring
			(Vec3::new(-half, -half, level1), cell.top_left().lerp(cell.top_right(), 0.5)),
			(Vec3::new(half, -half, level1), cell.top_right().lerp(cell.bottom_right(), 0.5)),
			(Vec3::new(half, half, level1), cell.bottom_left().lerp(cell.bottom_right(), 0.5)),
			(Vec3::new(-half, half, level1), cell.top_left().lerp(cell.bottom_left(), 0.5)),
			// drooping tips
			(Vec3::new(0.0, -f, level2), cell.top_right()),
			(Vec3::new(f, 0.0, level2), cell.bottom_right()),
			(Vec3::new(0.0, f, level2), cell.bottom_left()),
			(Vec3::new(-f, 0.0, level2), cell.top_left()),
		]
		.into_iter()
		.map(|(position, uv)| CapVertex::new(position, Vec3::Z, uv))
		.collect();

		let mut triangles = Vec::with_capacity(12);
		for i in 0..4 {
			let inner = 1 + i;
			let next_inner = 1 + (i + 1) % 4;
			triangles.push([0, next_inner, inner]);
		}
		for i in 0..4 {
			let (inner, next_inner) = (1 + i, 1 + (i + 1) % 4);
			let (tip, next_tip) = (5 + i, 5 + (i + 1) % 4);
			triangles.push([tip, inner, next_inner]);
			triangles.push([next_inner, next_tip, tip]);
		}

		CapLayout { vertices, triangles }
	}

	/// A square rim around a center apex at `tip`, closed by a second apex at `tip / 2`.
	///
	/// `reversed` flips every triangle so the same layout faces the other way.
	fn bowl(&self, f: f32, tip: f32, reversed: bool) -> CapLayout {
		let cell = &self.cell;
		let center = cell.center();
		let rim = |x: f32, y: f32, uv: Vec2| {
			CapVertex::new(Vec3::new(x * f, y * f, -tip), Vec3::new(x, y, 0.0).normalize(), uv)
		};
		let vertices = vec![
			CapVertex::new(Vec3::new(0.0, 0.0, tip), Vec3::Z, center),
			rim(-1.0, -1.0, cell.top_left()),
			rim(1.0, -1.0, cell.top_right()),
			rim(1.0, 1.0, cell.bottom_right()),
			rim(-1.0, 1.0, cell.bottom_left()),
			CapVertex::new(Vec3::new(0.0, 0.0, tip / 2.0), Vec3::Z, center),
		];

		let mut triangles = vec![
			[0, 1, 2],
			[0, 2, 3],
			[0, 3, 4],
			[0, 4, 1],
			[5, 2, 1],
			[5, 3, 2],
			[5, 4, 3],
			[5, 1, 4],
		];
		if reversed {
			for triangle in &mut triangles {
				triangle.swap(1, 2);
			}
		}

		CapLayout { vertices, triangles }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn emit(shape: FoliageShape, layout: LeafLayout) -> MeshAssembler {
		let mut assembler = MeshAssembler::new();
		let emitted = FoliageCap::new(shape, layout).emit(
			&mut assembler,
			Mat4::IDENTITY,
			Vec3::new(0.0, 0.0, 1.0),
			0.0,
			2.0,
		);
		assert!(emitted);
		assembler
	}

	#[test]
	fn test_every_shape_matches_its_topology() {
		for &shape in FoliageShape::ALL {
			let assembler = emit(shape, LeafLayout::Fan);
			assert_eq!(assembler.vertex_count() as u32, FoliageCap::vertex_count(shape), "{shape}");
			assert_eq!(
				assembler.triangle_count(Pass::Alpha) as u32,
				FoliageCap::triangle_count(shape),
				"{shape}"
			);
			assert!(assembler.indices(Pass::Opaque).is_empty());
			assert!(assembler.validate().is_ok());
		}
	}

	#[test]
	fn test_uvs_come_from_the_layout_cell() {
		let cells = [(LeafLayout::Fan, (0.25, 0.5)), (LeafLayout::Scatter, (0.75, 1.0))];
		for (layout, (min, max)) in cells {
			for &shape in FoliageShape::ALL {
				for vertex in emit(shape, layout).vertices() {
					assert!((min..=max).contains(&vertex.uv.x), "{shape} {layout} {}", vertex.uv);
				}
			}
		}
	}

	#[test]
	fn test_umbrella_is_a_reversed_bowl_with_the_tip_raised() {
		let bowl = emit(FoliageShape::Bowl, LeafLayout::Fan);
		let umbrella = emit(FoliageShape::Umbrella, LeafLayout::Fan);

		assert_eq!(bowl.vertices()[0].position.z, -0.5);
		assert_eq!(umbrella.vertices()[0].position.z, 0.5);

		let bowl_triangles = bowl.indices(Pass::Alpha).chunks_exact(3);
		for (b, u) in bowl_triangles.zip(umbrella.indices(Pass::Alpha).chunks_exact(3)) {
			assert_eq!([b[0], b[2], b[1]], [u[0], u[1], u[2]]);
		}
	}

	#[test]
	fn test_guarded_bowl_keeps_the_requested_depth() {
		for (shape, apex) in [(FoliageShape::Bowl, -1.5), (FoliageShape::Umbrella, 1.5)] {
			let mut assembler = MeshAssembler::new();
			let cap = FoliageCap::new(shape, LeafLayout::Fan);
			assert!(cap.emit(&mut assembler, Mat4::IDENTITY, Vec3::new(0.0, 0.0, 12.0), 0.0, 6.0));

			// the guard widens the rim to 12 - 2 but the apex stays at 6 / 4
			let vertices = assembler.vertices();
			assert_eq!(vertices[0].position.z, apex, "{shape}");
			assert_eq!(vertices[1].position, Vec4::new(-10.0, -10.0, -apex, 1.0), "{shape}");
			assert_eq!(vertices[5].position.z, apex / 2.0, "{shape}");
		}
	}

	#[test]
	fn test_sag_skirt_shares_edges_consistently() {
		let sag = emit(FoliageShape::Sag, LeafLayout::Fan);
		let mut edges = std::collections::HashSet::new();
		for triangle in sag.indices(Pass::Alpha).chunks_exact(3) {
			for k in 0..3 {
				// a directed edge appearing twice would mean a flipped neighbor
				assert!(edges.insert((triangle[k], triangle[(k + 1) % 3])), "{triangle:?}");
			}
		}
		assert_eq!(sag.vertices()[0].position.z, -0.8 / 16.0);
	}

	#[test]
	fn test_ground_guard() {
		// high anchors grow their foliage down towards the ground
		assert_eq!(FoliageCap::clamp_size(12.0, 6.0), Some(10.0));
		assert_eq!(FoliageCap::clamp_size(1.0, 3.0), Some(3.0));
		assert_eq!(FoliageCap::clamp_size(0.5, 0.05), None);

		let mut assembler = MeshAssembler::new();
		let cap = FoliageCap::new(FoliageShape::Panel, LeafLayout::Fan);
		assert!(!cap.emit(&mut assembler, Mat4::IDENTITY, Vec3::ZERO, 0.0, 0.0));
		assert!(assembler.is_empty());
	}

	#[test]
	fn test_cap_transform_places_and_turns_the_cap() {
		let mut assembler = MeshAssembler::new();
		let cap = FoliageCap::new(FoliageShape::Shield, LeafLayout::Fan);
		let anchor = Vec3::new(3.0, 4.0, 1.0);
		cap.emit(&mut assembler, Mat4::IDENTITY, anchor, std::f32::consts::FRAC_PI_2, 2.0);

		// the +X apex turns onto +Y
		let apex = assembler.vertices()[0].world_position();
		assert!(apex.abs_diff_eq(anchor + Vec3::new(0.0, 1.0, 0.0), 1e-5), "{apex}");
	}
}
