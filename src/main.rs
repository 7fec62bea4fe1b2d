#[cfg(feature = "cli")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use starmodel::core::config::Config;
    use starmodel::core::{ModelStore, RelationshipValidator, SnapshotCodec, create_demo_model};

    // Load .env file (if exists)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    tracing::info!(
        "Config loaded: seed={}, grid_columns={}, check_key_roles={}",
        config.has_seed(),
        config.layout.grid_columns,
        config.validator.check_key_roles
    );

    let store = match &config.seed_path {
        Some(path) => {
            tracing::info!("Loading seed snapshot from {}", path.display());
            let snapshot = SnapshotCodec::read_file(path)?;
            ModelStore::from_snapshot(snapshot, config.layout)?
        }
        None => create_demo_model(config.layout)?,
    };

    let report = RelationshipValidator::new(config.validator).validate(&store);
    for message in report.messages() {
        tracing::warn!("{}", message);
    }
    if report.is_clean() {
        tracing::info!("Model has no structural issues");
    }

    println!("{}", SnapshotCodec::encode(&store.snapshot())?);
    Ok(())
}

#[cfg(not(feature = "cli"))]
pub fn main() {
    // library-only build: the binary needs the `cli` feature
}
