//! Reference environments.

mod rolling_sphere;

pub use rolling_sphere::RollingSphere;
