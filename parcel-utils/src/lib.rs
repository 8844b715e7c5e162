mod dtime;
pub use dtime::*;
mod ordered_map;
pub use ordered_map::*;
mod sequence;
pub use sequence::*;
mod watch;
pub use watch::*;
