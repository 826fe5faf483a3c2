pub mod draft;
pub mod import;
pub mod init;

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use futures_util::{StreamExt, stream};

use crate::config::ImportConfig;
use crate::import::{HttpFetcher, ImportOutcome, Importer, PipelineError};

/// Load the config, apply the `--output` override and build the importer.
pub(crate) fn importer(
    config_file: Option<&Path>,
    output: Option<&Path>,
) -> Result<(Importer, ImportConfig), anyhow::Error> {
    let mut config = ImportConfig::load_from_arg(config_file)?;
    if let Some(output) = output {
        config.content_dir = output.to_path_buf();
    }

    let fetcher = HttpFetcher::new(&config.http)?;
    let importer = Importer::new(&config, Arc::new(fetcher))?;
    Ok((importer, config))
}

/// Run `convert` over every input, at most `concurrency` at a time, printing
/// one line per input in input order.
///
/// Fails if any input failed.
pub(crate) async fn run_all<F, Fut>(
    inputs: &[String],
    concurrency: usize,
    convert: F,
) -> Result<(), anyhow::Error>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<ImportOutcome, PipelineError>>,
{
    let mut results = stream::iter(inputs)
        .map(|input| {
            let fut = convert(input.clone());
            async move { (input, fut.await) }
        })
        .buffered(concurrency.max(1));

    let mut failed = 0;
    while let Some((input, result)) = results.next().await {
        match result {
            Ok(ImportOutcome::Imported(doc)) => {
                let missing = doc.assets.iter().filter(|a| !a.written).count();
                if missing > 0 {
                    println!("imported {} ({missing} asset(s) could not be downloaded)", doc.slug);
                } else {
                    println!("imported {}", doc.slug);
                }
            }
            Ok(ImportOutcome::Skipped) => println!("skipped {input}"),
            Err(err) => {
                failed += 1;
                tracing::debug!(input = %input, error = ?err, "import failed");
                println!("failed {input}: {err}");
            }
        }
    }

    if failed > 0 {
        return Err(anyhow::anyhow!(
            "{failed} of {total} document(s) failed to import",
            total = inputs.len()
        ));
    }
    Ok(())
}
