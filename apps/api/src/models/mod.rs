pub mod cv;
pub mod resume;
