pub mod festival;
pub mod image;
pub mod location;
pub mod news;
pub mod program;
pub mod shared;
