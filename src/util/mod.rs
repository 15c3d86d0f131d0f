//! Small helpers shared by the backend and the reporting code.

pub mod layout;
pub mod size;
