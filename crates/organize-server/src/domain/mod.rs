mod appointment;
mod directory;
mod transaction;
mod webhook;

pub use appointment::*;
pub use directory::*;
pub use transaction::*;
pub use webhook::*;
