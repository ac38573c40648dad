pub mod location;
pub mod observation;
pub mod sky;
pub mod time;

pub use location::*;
pub use observation::*;
pub use sky::*;
pub use time::*;
