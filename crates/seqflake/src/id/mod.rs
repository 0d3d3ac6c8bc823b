mod radix36;
mod snowflake;

pub use radix36::ENCODED_LEN as RADIX36_LEN;
pub use snowflake::*;
