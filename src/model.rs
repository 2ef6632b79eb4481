pub mod fs;
pub mod visibility;
