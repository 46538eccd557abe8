pub mod dispatch;
pub mod echo;
