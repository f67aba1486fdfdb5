use super::{MeshAssembler, Pass, Vertex};
use bytemuck::{Pod, Zeroable};

/// Vertex layout handed to the renderer: position, normal, uv and the column-major model matrix.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuVertex {
	pub position: [f32; 4],
	pub normal: [f32; 3],
	pub uv: [f32; 2],
	pub model: [f32; 16],
}

impl From<&Vertex> for GpuVertex {
	fn from(vertex: &Vertex) -> Self {
		Self {
			position: vertex.position.to_array(),
			normal: vertex.normal.to_array(),
			uv: vertex.uv.to_array(),
			model: vertex.transform.to_cols_array(),
		}
	}
}

impl MeshAssembler {
	pub fn to_gpu_vertices(&self) -> Vec<GpuVertex> {
		self.vertices().iter().map(GpuVertex::from).collect()
	}

	/// Packs the vertex list followed by the opaque and alpha index lists.
	///
	/// Two assemblers built from the same seed and parameters produce identical bytes.
	pub fn to_bytes(&self) -> Vec<u8> {
		let vertices = self.to_gpu_vertices();
		let mut bytes = Vec::with_capacity(
			std::mem::size_of_val(vertices.as_slice())
				+ 4 * (self.indices(Pass::Opaque).len()
					+ self.indices(Pass::Alpha).len()),
		);
		bytes.extend_from_slice(bytemuck::cast_slice(&vertices));
		bytes.extend_from_slice(bytemuck::cast_slice(self.indices(Pass::Opaque)));
		bytes.extend_from_slice(bytemuck::cast_slice(self.indices(Pass::Alpha)));
		bytes
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bevy::prelude::*;

	#[test]
	fn test_gpu_vertex_is_tightly_packed() {
		assert_eq!(std::mem::size_of::<GpuVertex>(), (4 + 3 + 2 + 16) * 4);
	}

	#[test]
	fn test_bytes_cover_vertices_and_both_passes() {
		let mut assembler = MeshAssembler::new();
		for position in [Vec3::ZERO, Vec3::X, Vec3::Y] {
			assembler.push_vertex(Vertex::new(position, Vec3::Z, Vec2::ONE, Mat4::IDENTITY));
		}
		assembler.emit_triangle(Pass::Opaque, 0, 1, 2);
		assembler.emit_triangle(Pass::Alpha, 2, 1, 0);

		let bytes = assembler.to_bytes();
		assert_eq!(bytes.len(), 3 * std::mem::size_of::<GpuVertex>() + 6 * 4);

		let packed = assembler.to_gpu_vertices();
		assert_eq!(packed[1].position, [1.0, 0.0, 0.0, 1.0]);
		assert_eq!(packed[1].model, Mat4::IDENTITY.to_cols_array());
	}
}
