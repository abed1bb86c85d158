use std::path::PathBuf;
use tracing::info;
use crate::cli::commands::ValidateArgs;
use crate::config;
use crate::errors::CloudmareError;

pub async fn handle_validate(args: ValidateArgs) -> Result<(), CloudmareError> {
    let path = PathBuf::from(&args.config);
    let parsed = config::parse_config(&path).await?;
    info!(
        scan = parsed.scan.is_some(),
        enumeration = parsed.enumeration.is_some(),
        output = parsed.output.is_some(),
        "Configuration sections present"
    );
    println!("Configuration is valid: {}", args.config);
    Ok(())
}
