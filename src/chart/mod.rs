pub mod component;
pub mod model;
pub mod range;
pub mod scheduler;

pub use component::TankChart;
pub use model::{
    DisplayState, FetchState, Mode, Navigation, PanDirection, TelemetryPoint, TimeRange,
    TimeWindow,
};
pub use scheduler::RefreshScheduler;
