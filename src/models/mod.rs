pub mod heston;
pub mod model;
pub mod sabr;
