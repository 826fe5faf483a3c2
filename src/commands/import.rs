use crate::ImportArgs;

use super::{importer, run_all};

pub async fn run(args: &ImportArgs) -> Result<(), anyhow::Error> {
    let (importer, config) = importer(args.config_file.as_deref(), args.output.as_deref())?;

    println!(
        "Importing {count} article(s) into {dir}",
        count = args.urls.len(),
        dir = importer.content_dir().display()
    );

    let importer = &importer;
    run_all(&args.urls, config.concurrency, |url| async move {
        importer.import_remote(&url).await
    })
    .await
}
