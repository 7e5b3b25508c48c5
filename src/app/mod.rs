pub mod assistant;
pub mod dashboard;
pub mod engagement;
pub mod feed;
pub mod media;
pub mod posts;
pub mod social;
pub mod suggestions;
pub mod users;
