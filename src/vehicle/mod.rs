pub mod camera;
pub mod input;
pub mod tank;

pub use camera::{CameraConfig, ChaseCamera};
pub use input::{ControlInput, InputState};
pub use tank::{TankTuning, VehicleState, VehicleStepper};
