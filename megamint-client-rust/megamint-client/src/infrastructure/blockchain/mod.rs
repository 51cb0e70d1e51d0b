pub mod gateway;
pub mod reconciler;

pub use gateway::FactoryGateway;
pub use reconciler::{NetworkReconciler, ReconcileOutcome};
