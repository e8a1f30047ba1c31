pub mod ids;
pub mod lenient;
pub mod marker;
pub mod snapshot;
pub mod timestamp;
