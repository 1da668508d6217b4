mod camera_control;
mod onvif_camera;
mod onvif_profiles;
pub mod onvif_requests;
mod onvif_services;
mod soap;
mod target;
mod wsse;

pub use camera_control::{CameraControl, MockCameraControl};
pub use onvif_camera::OnvifCamera;
pub use target::{OnvifAuth, OnvifTarget};
