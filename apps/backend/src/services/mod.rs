pub mod cards;
pub mod users;
