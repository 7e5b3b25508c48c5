pub mod engagement;
pub mod post;
pub mod ranking;
pub mod stats;
pub mod user;
