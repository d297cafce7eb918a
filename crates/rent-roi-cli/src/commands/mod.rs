pub mod analyze;
pub mod loan;
