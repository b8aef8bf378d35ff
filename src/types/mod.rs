pub mod cell;
pub mod frame;
pub mod info;
pub mod log;

pub use cell::*;
pub use frame::*;
pub use info::*;
pub use log::*;
