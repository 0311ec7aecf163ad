//! Drumfall: rhythm scheduling, collision and hit-judgment core for an XR drum game.

pub mod collision;
pub mod config;
pub mod judge;
pub mod score;
pub mod session;
pub mod sim;
pub mod timing;
pub mod track;
