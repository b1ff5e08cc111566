pub mod distances;
pub mod spell;
pub mod verify;
