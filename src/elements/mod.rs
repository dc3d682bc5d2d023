//! Structural model primitives

mod element;
mod material;
mod node;
mod section;
mod support;

pub use element::{Element, ElementKind};
pub use material::Material;
pub use node::Node;
pub use section::Section;
pub use support::{Foundation, Support};
