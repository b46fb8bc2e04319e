pub mod room;
pub mod sweep;
