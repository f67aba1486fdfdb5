use super::{MeshAssembler, Pass};
use std::io::{self, Write};

impl MeshAssembler {
	/// Writes the buffers as Wavefront OBJ with world-space positions and normals.
	///
	/// Each pass becomes its own group (`g opaque`, `g alpha`) so viewers can assign the bark and
	/// the blended foliage materials separately.
	pub fn write_obj<W: Write>(&self, writer: &mut W, name: &str) -> io::Result<()> {
		writeln!(writer, "o {name}")?;

		for vertex in self.vertices() {
			let p = vertex.world_position();
			writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
		}
		for vertex in self.vertices() {
			writeln!(writer, "vt {} {}", vertex.uv.x, vertex.uv.y)?;
		}
		for vertex in self.vertices() {
			let n = vertex.world_normal();
			writeln!(writer, "vn {} {} {}", n.x, n.y, n.z)?;
		}

		for (pass, group) in [(Pass::Opaque, "opaque"), (Pass::Alpha, "alpha")] {
			writeln!(writer, "g {group}")?;
			for triangle in self.indices(pass).chunks_exact(3) {
				// OBJ indices are 1-based
				let [a, b, c] = [triangle[0] + 1, triangle[1] + 1, triangle[2] + 1];
				writeln!(writer, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
			}
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::mesh::Vertex;
	use bevy::prelude::*;
	use std::io::Read;

	fn triangle_assembler() -> MeshAssembler {
		let mut assembler = MeshAssembler::new();
		for position in [Vec3::ZERO, Vec3::X, Vec3::Y] {
			assembler.push_vertex(Vertex::new(position, Vec3::Z, Vec2::ZERO, Mat4::IDENTITY));
		}
		assembler.emit_triangle(Pass::Opaque, 0, 1, 2);
		assembler
	}

	#[test]
	fn test_obj_uses_one_based_faces() {
		let mut out = Vec::new();
		triangle_assembler().write_obj(&mut out, "tri").unwrap();
		let text = String::from_utf8(out).unwrap();

		assert!(text.starts_with("o tri\n"));
		assert_eq!(text.lines().filter(|line| line.starts_with("v ")).count(), 3);
		assert!(text.contains("g opaque\nf 1/1/1 2/2/2 3/3/3\ng alpha\n"));
	}

	#[test]
	fn test_obj_round_trips_through_a_file() {
		let mut file = tempfile::tempfile().unwrap();
		triangle_assembler().write_obj(&mut file, "tri").unwrap();

		use std::io::{Seek, SeekFrom};
		file.seek(SeekFrom::Start(0)).unwrap();
		let mut text = String::new();
		file.read_to_string(&mut text).unwrap();

		assert_eq!(text.lines().filter(|line| line.starts_with("f ")).count(), 1);
		assert!(text.contains("vn 0 0 1"));
	}
}
