pub mod audit;
pub mod reconcile;
pub mod validate;
