pub mod display;
pub mod power;
pub mod tcp;
