pub mod model;
pub mod rewrite;
pub mod spec;

pub use model::*;
pub use rewrite::*;
pub use spec::*;
