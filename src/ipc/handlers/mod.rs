pub mod attendance;
pub mod backup;
pub mod core;
pub mod daily;
pub mod events;
pub mod finance;
pub mod instructors;
pub mod progress;
pub mod students;
pub mod sync;
