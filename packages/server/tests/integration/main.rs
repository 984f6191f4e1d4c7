mod common;

mod festival;
mod location;
mod program;
