pub mod attendance;
pub mod attendance_day;
pub mod limits;
pub mod setting;
pub mod stats;
pub mod user;
