pub mod asset;
pub mod bias;
pub mod change_set;
pub mod sequence;

pub use asset::*;
pub use bias::*;
pub use change_set::*;
pub use sequence::*;
