pub mod fetch_state;
pub mod resize_observer;
