/// External accelerations applied during leader integration.
pub mod gravity;
pub mod wind;
