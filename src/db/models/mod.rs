mod dinner;
mod user;

pub use dinner::{Dinner, DinnerAverage};
pub use user::User;
