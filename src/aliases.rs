use nalgebra as na;

pub type Vec3 = na::Vector3<f64>;
