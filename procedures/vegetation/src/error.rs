use render_item::MeshError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VegetationError {
	#[error("invalid argument `{name}`: {reason}")]
	InvalidArgument { name: &'static str, reason: String },
	#[error(transparent)]
	Mesh(#[from] MeshError),
}

impl VegetationError {
	pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
		Self::InvalidArgument { name, reason: reason.into() }
	}
}
