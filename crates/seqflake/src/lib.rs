mod config;
mod error;
mod ext;
mod generator;
mod hashids;
mod id;
mod machine;
#[cfg(feature = "serde")]
mod serde;
mod time;

pub use crate::config::*;
pub use crate::error::*;
pub use crate::ext::*;
pub use crate::generator::*;
pub use crate::hashids::*;
pub use crate::id::*;
pub use crate::machine::*;
#[cfg(feature = "serde")]
pub use crate::serde::*;
pub use crate::time::*;
