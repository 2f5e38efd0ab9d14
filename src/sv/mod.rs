pub mod attendance;
pub mod experience;
pub mod limits;
pub mod ranking;
pub mod settings;
pub mod user;

pub use attendance::Attendance;
pub use experience::Experience;
pub use limits::Limits;
pub use ranking::Ranking;
pub use settings::Settings;
pub use user::User;
