//! `annobox-check`: headless report of a dataset folder.
//!
//! Lists every image with its labelled status and box count, validating
//! each label file against the image's pixel size.
//!
//! Exit codes: 0 success, 1 unreadable folder, 2 usage error.

use std::path::PathBuf;
use std::process::ExitCode;

use annobox::config::AppConfig;
use annobox::dataset::{DatasetError, DatasetRepository, LabelCatalog};

fn init_logging(config: &AppConfig) {
    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.to_level_filter())
        .parse_default_env()
        .init();
}

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let (Some(folder), None) = (args.next(), args.next()) else {
        eprintln!("Usage: annobox-check <dataset-folder>");
        return ExitCode::from(2);
    };

    let config = AppConfig::load_from_default_path().unwrap_or_default();
    init_logging(&config);

    let folder = PathBuf::from(folder);
    let repo = match DatasetRepository::open(&folder) {
        Ok(repo) => repo,
        Err(DatasetError::NoImages(_)) => {
            println!("{}: no images", folder.display());
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(1);
        }
    };

    match LabelCatalog::load(&folder) {
        Ok(catalog) => println!("{} labels", catalog.categories().len()),
        Err(e) => log::warn!("Label catalogue unusable: {}", e),
    }

    let mut labelled = 0;
    let mut invalid = 0;
    for (index, record) in repo.images().iter().enumerate() {
        let name = record
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let status = if record.labelled { "labelled" } else { "unlabelled" };
        if record.labelled {
            labelled += 1;
        }

        match repo.check_labels(index) {
            Ok(count) => println!("{name}\t{status}\t{count} boxes"),
            Err(e) => {
                invalid += 1;
                println!("{name}\t{status}\tinvalid: {e}");
            }
        }
    }

    println!(
        "{} images, {} labelled, {} with invalid labels",
        repo.len(),
        labelled,
        invalid
    );
    ExitCode::SUCCESS
}
