pub mod export;
pub mod gpu;
pub mod obj;

use bevy::prelude::*;

/// Which index list a triangle is drawn from.
///
/// The opaque pass is drawn first; the alpha pass is drawn afterwards with blending enabled so
/// translucent foliage composites over bark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
	Opaque,
	Alpha,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
	#[error(
		"{pass:?} index {index} at position {position} is out of range for {vertex_count} vertices"
	)]
	IndexOutOfRange { pass: Pass, position: usize, index: u32, vertex_count: usize },
	#[error("{pass:?} index list has {len} entries, which is not a whole number of triangles")]
	PartialTriangle { pass: Pass, len: usize },
}

/// A single vertex of the shared buffer.
///
/// The local-to-world transform travels with the vertex because one buffer holds many
/// independently placed sub-meshes (trunk, branches, foliage caps).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
	/// Homogeneous position; `w` is 1 for points.
	pub position: Vec4,
	pub normal: Vec3,
	pub uv: Vec2,
	pub transform: Mat4,
}

impl Vertex {
	pub fn new(position: Vec3, normal: Vec3, uv: Vec2, transform: Mat4) -> Self {
		Self { position: position.extend(1.0), normal, uv, transform }
	}

	pub fn world_position(&self) -> Vec3 {
		(self.transform * self.position).truncate()
	}

	pub fn world_normal(&self) -> Vec3 {
		self.transform.transform_vector3(self.normal).normalize_or_zero()
	}
}

/// Owns the growing vertex list and the two index lists every generator appends to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshAssembler {
	vertices: Vec<Vertex>,
	opaque: Vec<u32>,
	alpha: Vec<u32>,
}

impl MeshAssembler {
	pub fn new() -> Self {
		Self::default()
	}

	/// Index the next pushed vertex will receive.
	pub fn next_index(&self) -> u32 {
		self.vertices.len() as u32
	}

	pub fn push_vertex(&mut self, vertex: Vertex) -> u32 {
		let index = self.next_index();
		self.vertices.push(vertex);
		index
	}

	pub fn emit_triangle(&mut self, pass: Pass, i0: u32, i1: u32, i2: u32) {
		let vertex_count = self.next_index();
		debug_assert!(
			i0 < vertex_count && i1 < vertex_count && i2 < vertex_count,
			"triangle ({i0}, {i1}, {i2}) references past {vertex_count} vertices"
		);
		self.indices_mut(pass).extend_from_slice(&[i0, i1, i2]);
	}

	/// Emits the quad `i0 i1 i2 i3` as two triangles sharing the `i0`-`i2` diagonal.
	pub fn emit_quad(&mut self, pass: Pass, i0: u32, i1: u32, i2: u32, i3: u32) {
		self.emit_triangle(pass, i0, i1, i2);
		self.emit_triangle(pass, i0, i2, i3);
	}

	pub fn vertices(&self) -> &[Vertex] {
		&self.vertices
	}

	pub fn indices(&self, pass: Pass) -> &[u32] {
		match pass {
			Pass::Opaque => &self.opaque,
			Pass::Alpha => &self.alpha,
		}
	}

	fn indices_mut(&mut self, pass: Pass) -> &mut Vec<u32> {
		match pass {
			Pass::Opaque => &mut self.opaque,
			Pass::Alpha => &mut self.alpha,
		}
	}

	pub fn vertex_count(&self) -> usize {
		self.vertices.len()
	}

	pub fn triangle_count(&self, pass: Pass) -> usize {
		self.indices(pass).len() / 3
	}

	pub fn is_empty(&self) -> bool {
		self.vertices.is_empty() && self.opaque.is_empty() && self.alpha.is_empty()
	}

	/// Checks that both index lists hold whole triangles and only reference existing vertices.
	pub fn validate(&self) -> Result<(), MeshError> {
		let vertex_count = self.vertices.len();
		for pass in [Pass::Opaque, Pass::Alpha] {
			let indices = self.indices(pass);
			if indices.len() % 3 != 0 {
				return Err(MeshError::PartialTriangle { pass, len: indices.len() });
			}
			if let Some(position) =
				indices.iter().position(|&index| index as usize >= vertex_count)
			{
				let index = indices[position];
				return Err(MeshError::IndexOutOfRange { pass, position, index, vertex_count });
			}
		}
		Ok(())
	}
}
