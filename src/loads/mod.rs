//! Load types, cases and code-driven combinations

mod code_profile;
mod distributed;
mod load_case;
mod load_combo;
mod node_load;
mod point_load;

pub use code_profile::{CodeProfile, DesignCode, SeismicZone};
pub use distributed::DistributedLoad;
pub use load_case::{CaseKind, LoadCase};
pub use load_combo::LoadCombination;
pub use node_load::NodeLoad;
pub use point_load::{LoadDirection, PointLoad};
