pub mod cli;
pub mod pgm;
mod run;

pub use run::run;
