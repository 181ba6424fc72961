use crate::cli::RulesArgs;
use crate::error::{CliError, Result};
use capsidomics::core::rules::RuleTables;
use tracing::info;

pub async fn run(args: RulesArgs) -> Result<()> {
    let rendered = RuleTables::default()
        .to_toml_string()
        .map_err(|e| CliError::Other(e.into()))?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered).map_err(|e| CliError::writing(path, e))?;
            info!("Default rule tables written to {:?}", path);
            println!("Default rule tables written to: {}", path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
