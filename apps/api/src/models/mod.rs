pub mod consultant;
pub mod session;
