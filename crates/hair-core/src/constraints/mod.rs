/// Positional and velocity constraints used by the compute stages.
pub mod ellipsoid;
pub mod follow;
pub mod volume;
