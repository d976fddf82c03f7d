use crate::api::Mode;
use crate::args::ImportArgs;
use crate::commands::{open, Out};
use crate::{Config, Result};
use anyhow::bail;
use tracing::debug;

/// Imports a bank export. The layout is detected unless `--definition` names one, in which case
/// the file must still match it.
pub async fn import(config: Config, mode: Mode, args: ImportArgs) -> Result<Out<String>> {
    let context = open(&config, mode).await?;
    let matches = context.open_csv(args.file()).await?;
    debug!("{} matches {matches:?}", args.file().display());
    let key = match (args.definition(), matches.first()) {
        (Some(key), _) if matches.contains(&key) => key,
        (Some(key), _) => bail!("{} is not a {key} export", args.file().display()),
        (None, Some(key)) => *key,
        (None, None) => bail!(
            "{} does not match any supported bank export",
            args.file().display()
        ),
    };
    let summary = context.import_csv(args.file(), key).await?;
    Ok(Out::new(summary.clone(), summary))
}
