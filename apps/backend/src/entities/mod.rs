pub mod card_likes;
pub mod cards;
pub mod users;
