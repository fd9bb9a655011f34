pub mod messages;
pub mod setpoint;
