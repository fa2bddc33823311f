pub mod clock;
pub mod typing_guard;
