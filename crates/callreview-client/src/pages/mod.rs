//! Page views rendered by the terminal shell

pub mod call_detail;
pub mod login;
pub mod manager_dashboard;
pub mod not_found;
pub mod rep_dashboard;

pub use call_detail::{CallDetail, CallDetailState};
pub use login::LoginPage;
pub use manager_dashboard::{ManagerDashboard, Report};
pub use not_found::NotFound;
pub use rep_dashboard::RepDashboard;
