use crate::{
    InitArgs,
    config::{DEFAULT_CONFIG_FILE, ImportConfig},
};

pub async fn run(args: &InitArgs) -> Result<(), anyhow::Error> {
    let path = if args.path.is_relative() {
        std::env::current_dir()?.join(&args.path)
    } else {
        args.path.clone()
    };

    if !path.exists() {
        if args.create {
            tokio::fs::create_dir_all(&path).await?;
            println!("Created directory {path}", path = path.display());
        } else {
            return Err(anyhow::anyhow!(
                "Directory does not exist: {path}",
                path = path.display()
            ));
        }
    }

    let config_file = path.join(DEFAULT_CONFIG_FILE);
    if config_file.exists() {
        return Err(anyhow::anyhow!(
            "Config file already exists: {config_file}",
            config_file = config_file.display()
        ));
    }

    println!("Initializing project in {}", path.display());

    let config_text = serde_yaml::to_string(&ImportConfig::default())?;
    tokio::fs::write(&config_file, config_text).await?;

    println!(
        "Created config file {config_file}",
        config_file = config_file.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let args = InitArgs {
            path: dir.path().to_path_buf(),
            create: false,
        };

        run(&args).await.unwrap();

        let written = std::fs::read_to_string(dir.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        let parsed: ImportConfig = serde_yaml::from_str(&written).unwrap();
        assert_eq!(parsed, ImportConfig::default());

        // A second run refuses to overwrite it.
        assert!(run(&args).await.is_err());
    }

    #[tokio::test]
    async fn test_init_creates_directory_only_when_asked() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("blog");

        let args = InitArgs {
            path: target.clone(),
            create: false,
        };
        assert!(run(&args).await.is_err());

        let args = InitArgs {
            path: target.clone(),
            create: true,
        };
        run(&args).await.unwrap();
        assert!(target.join(DEFAULT_CONFIG_FILE).exists());
    }
}
