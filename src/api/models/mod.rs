pub mod cartoons;
pub mod system;

pub use cartoons::*;
pub use system::*;
