pub mod interaction;
pub mod order;
pub mod outcome;
pub mod session;
