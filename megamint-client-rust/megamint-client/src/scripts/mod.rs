pub mod deploy;

pub use deploy::{DeploymentRecord, DeploymentSettings, FactoryDeployer};
