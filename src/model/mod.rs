pub mod animation;
pub mod document;
pub mod link;
pub mod point;

pub use animation::*;
pub use document::*;
pub use link::*;
pub use point::*;

pub(crate) const fn is_false(value: &bool) -> bool {
    !*value
}
