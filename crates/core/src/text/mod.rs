pub mod diff;
pub mod matcher;
pub mod normalize;
