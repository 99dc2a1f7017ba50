//! Survey domain module.
//!
//! Ratings on the 0-10 agreement scale, the answer set for one survey, and
//! the fixed band classification that turns an average into a stance.

mod answers;
mod band;
mod rating;

pub use answers::SurveyAnswers;
pub use band::{classify_average, StanceBand, ANTI_BELOW, PRO_FROM};
pub use rating::SurveyRating;
