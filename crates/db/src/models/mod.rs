pub mod company;
pub mod criteria;
pub mod parameter;
pub mod screening_result;
