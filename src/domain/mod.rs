mod integrity;
mod money;
mod rental;
mod vehicle;

pub use integrity::*;
pub use money::*;
pub use rental::*;
pub use vehicle::*;
