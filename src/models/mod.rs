pub mod appointment;
pub mod enums;
pub mod filters;
pub mod profile;
pub mod review;

pub use appointment::*;
pub use enums::*;
pub use filters::*;
pub use profile::*;
pub use review::*;
