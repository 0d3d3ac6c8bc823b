mod batch;
mod default;
mod engine;
mod global;
mod interface;
mod mutex;


pub use batch::*;
pub use default::*;
pub use global::*;
pub use interface::*;
