use super::{MeshAssembler, Pass};
use bevy::prelude::*;

impl MeshAssembler {
	/// Builds a triangle-list [`Mesh`] for one pass.
	///
	/// Bevy meshes carry a single transform per entity, so per-vertex transforms are baked into the
	/// positions and normals. The whole vertex list is kept so the pass indices stay valid.
	pub fn to_bevy_mesh(&self, pass: Pass) -> Mesh {
		let positions: Vec<[f32; 3]> =
			self.vertices().iter().map(|vertex| vertex.world_position().to_array()).collect();
		let normals: Vec<[f32; 3]> =
			self.vertices().iter().map(|vertex| vertex.world_normal().to_array()).collect();
		let uvs: Vec<[f32; 2]> =
			self.vertices().iter().map(|vertex| vertex.uv.to_array()).collect();

		log::debug!(
			"Exporting {:?} pass: {} vertices, {} triangles",
			pass,
			positions.len(),
			self.triangle_count(pass)
		);

		let mut mesh = Mesh::new(
			bevy::mesh::PrimitiveTopology::TriangleList,
			bevy::asset::RenderAssetUsages::RENDER_WORLD,
		);
		mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
		mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
		mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
		mesh.insert_indices(bevy::mesh::Indices::U32(self.indices(pass).to_vec()));

		mesh
	}
}
