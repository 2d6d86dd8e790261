pub mod logging;
pub mod restore;
pub mod retention;
