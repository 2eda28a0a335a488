mod charge;
mod document;
mod money;

pub use charge::*;
pub use document::*;
pub use money::*;
