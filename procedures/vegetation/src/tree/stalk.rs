pub mod branches;
pub mod trunk;

pub use branches::{BranchAnchorPlanner, TrunkAnchor};
pub use trunk::TrunkProfile;

/// Smallest radius any trunk or branch ring is allowed to shrink to.
pub const MIN_RADIUS: f32 = 0.3;
