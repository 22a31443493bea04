pub mod auth;
pub mod dashboard;
pub mod side_panel;
