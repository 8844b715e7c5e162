mod dataset;
pub use dataset::*;
mod matrix;
pub use matrix::*;
mod model;
pub use model::*;
mod route;
pub use route::*;
mod stop;
pub use stop::*;
mod tour;
pub use tour::*;
