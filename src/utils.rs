pub mod math;
pub mod misc;
pub mod seeker;

pub use math::{circumcenter, IsLeft, TAU};
pub use misc::Cached;
pub use seeker::{Quantify, QuantifiedInsert, Seek};
