pub mod festival;
pub mod image;
pub mod location;
pub mod media;
pub mod news;
pub mod program;
