//! Character profiles and professions.

pub mod profession;
pub mod profile;

pub use profession::{profession, Profession, ProfessionId, SpecialAction};
pub use profile::{validate_stats, CharacterProfile, CharacterStats};
