pub mod deployments;
pub mod pods;
pub mod status;
