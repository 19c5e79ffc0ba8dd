pub mod affliction;
pub mod card;
pub mod deck;
pub mod discovery;
pub mod location;
pub mod player;
pub mod role;
pub mod spread;
