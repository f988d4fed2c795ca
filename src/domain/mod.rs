pub mod card;
pub mod review;

pub use card::{Flashcard, NewFlashcard, Topic, User};
pub use review::{ReviewOrder, ReviewPreferences, ReviewRecord, ReviewState, Transition};
