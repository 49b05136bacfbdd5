pub mod coordinate;
pub mod driver;
pub mod event;
pub mod ids;
pub mod ride;
pub mod rider;
