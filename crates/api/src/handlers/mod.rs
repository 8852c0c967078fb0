pub mod expressions;
pub mod parameters;
pub mod screenings;
