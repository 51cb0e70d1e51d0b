use megamint_client::infrastructure::logger::{LogConfig, Logger};
use megamint_client::scripts::deploy::{DeploymentSettings, FactoryDeployer};

#[tokio::main]
async fn main() {
    Logger::init_with(LogConfig {
        service_name: "deploy_factory".to_string(),
        enable_thread_ids: false,
        ..LogConfig::default()
    });

    let settings = match DeploymentSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    match FactoryDeployer::new(settings).deploy().await {
        Ok(record) => {
            log::info!("🎉 Deployment complete! Factory {:?} is ready to create tokens.", record.factory_address);
        }
        Err(e) => {
            log::error!("❌ Deployment failed: {:#}", e);
            std::process::exit(1);
        }
    }
}
