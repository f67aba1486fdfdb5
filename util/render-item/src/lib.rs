pub mod mesh;

pub use mesh::{MeshAssembler, MeshError, Pass, Vertex};

/// Used for logical items that append their constituents into a shared [`MeshAssembler`].
///
/// Items only ever append: vertices already in the assembler belong to whoever emitted them and
/// are referenced by index, never rewritten.
pub trait RenderItem {
	/// Appends this item's vertices and indices to the assembler.
	fn assemble(&self, assembler: &mut MeshAssembler);

	/// Builds the item into a fresh assembler.
	fn assembled(&self) -> MeshAssembler {
		let mut assembler = MeshAssembler::new();
		self.assemble(&mut assembler);
		assembler
	}
}
