use crate::DraftArgs;
use crate::import::PipelineError;

use super::{importer, run_all};

pub async fn run(args: &DraftArgs) -> Result<(), anyhow::Error> {
    let (importer, config) = importer(args.config_file.as_deref(), args.output.as_deref())?;

    let files: Vec<String> = args
        .files
        .iter()
        .map(|file| file.display().to_string())
        .collect();

    println!(
        "Importing {count} draft(s) into {dir}",
        count = files.len(),
        dir = importer.content_dir().display()
    );

    let importer = &importer;
    run_all(&files, config.concurrency, |file| async move {
        let html = tokio::fs::read_to_string(&file)
            .await
            .map_err(|e| PipelineError::io(&file, e))?;
        importer.import_draft(&html).await
    })
    .await
}
