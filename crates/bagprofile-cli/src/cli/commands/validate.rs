use anyhow::Context;
use bagprofile_core::{
    BagValidator, MetadataRepository, RuleCatalog, SnapshotRepository, ValidateError,
    ValidationReport, ValidationRequest,
};
use std::sync::Arc;
use std::time::Duration;

use crate::archive::{self, ExtractedBag};
use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::CliConfig;
use crate::exit_codes;

pub async fn run(args: ValidateArgs) -> anyhow::Result<i32> {
    // 1. Configuration and catalog: failures here are internal errors
    let config = match CliConfig::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return Ok(exit_codes::INTERNAL_ERROR);
        }
    };
    let validator = match build_validator(&args, &config) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return Ok(exit_codes::INTERNAL_ERROR);
        }
    };

    // 2. Resolve the bag, unpacking archives
    let extracted: Option<ExtractedBag> = if archive::is_archive(&args.bag) {
        match archive::extract_with_limits(&args.bag, config.extract_limits()) {
            Ok(x) => Some(x),
            Err(e) => {
                eprintln!("rejected: {:#}", e);
                return Ok(exit_codes::REJECTED);
            }
        }
    } else {
        None
    };
    let bag_dir = extracted
        .as_ref()
        .map_or_else(|| args.bag.clone(), |x| x.bag_dir.clone());
    let request = ValidationRequest::new(bag_dir)
        .with_variant(args.variant.into())
        .with_context(args.context.into());

    // 3. Validate on the blocking pool
    let limit = args.timeout_secs.map(Duration::from_secs);
    let outcome = match run_blocking(move || validator.validate(&request), limit, extracted).await? {
        Some(outcome) => outcome,
        None => {
            eprintln!(
                "error: validation did not finish within {}s",
                args.timeout_secs.unwrap_or_default()
            );
            return Ok(exit_codes::INTERNAL_ERROR);
        }
    };

    // 4. Exit code and output
    match outcome {
        Ok(report) => {
            print_report(&report, args.format)?;
            Ok(decide_exit(&report))
        }
        Err(e) => {
            eprintln!("{}: {}", if is_rejection(&e) { "rejected" } else { "error" }, e);
            Ok(exit_code_for(&e))
        }
    }
}

/// Run `work` on the blocking pool, giving up after `limit`. Returns `None`
/// on timeout. The extracted bag is removed before returning in both cases.
async fn run_blocking<T: Send + 'static>(
    work: impl FnOnce() -> T + Send + 'static,
    limit: Option<Duration>,
    extracted: Option<ExtractedBag>,
) -> anyhow::Result<Option<T>> {
    let task = tokio::task::spawn_blocking(work);
    let joined = match limit {
        Some(limit) => tokio::time::timeout(limit, task).await.ok(),
        None => Some(task.await),
    };

    if let Some(extracted) = extracted {
        let bag_dir = extracted.bag_dir.clone();
        if let Err(e) = extracted.close() {
            tracing::warn!(bag = %bag_dir.display(), error = %e, "failed to remove extracted bag");
        }
    }

    match joined {
        Some(result) => Ok(Some(result.context("validation task panicked")?)),
        None => Ok(None),
    }
}

fn build_validator(args: &ValidateArgs, config: &CliConfig) -> anyhow::Result<BagValidator> {
    let catalog = RuleCatalog::builtin().context("built-in rule catalog is inconsistent")?;
    let mut validator = BagValidator::new(Arc::new(catalog)).with_settings(config.settings());

    if let Some(path) = args.repository.as_ref().or(config.repository.as_ref()) {
        let repository: Arc<dyn MetadataRepository> = Arc::new(SnapshotRepository::load(path)?);
        validator = validator.with_repository(repository);
    }
    Ok(validator)
}

fn decide_exit(report: &ValidationReport) -> i32 {
    if report.is_compliant {
        exit_codes::COMPLIANT
    } else {
        exit_codes::NON_COMPLIANT
    }
}

fn is_rejection(e: &ValidateError) -> bool {
    matches!(
        e,
        ValidateError::BagNotFound { .. }
            | ValidateError::BagUnreadable(_)
            | ValidateError::ContextUnavailable { .. }
    )
}

fn exit_code_for(e: &ValidateError) -> i32 {
    if is_rejection(e) {
        exit_codes::REJECTED
    } else {
        exit_codes::INTERNAL_ERROR
    }
}

fn print_report(report: &ValidationReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => print!("{}", report.to_text()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bagprofile_core::{EngineError, ValidationContext};
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::path::{Path, PathBuf};

    fn extracted_bag(dir: &Path) -> ExtractedBag {
        let path = dir.join("bag.tar.gz");
        let file = std::fs::File::create(&path).unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        let mut header = tar::Header::new_gnu();
        header.set_size(3);
        header.set_mode(0o644);
        builder
            .append_data(&mut header, "bag-1/data/a.txt", &b"abc"[..])
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap();
        archive::extract_with_limits(&path, archive::ExtractLimits::default()).unwrap()
    }

    #[tokio::test]
    async fn timed_out_run_still_removes_the_extracted_bag() {
        let dir = tempfile::tempdir().unwrap();
        let extracted = extracted_bag(dir.path());
        let bag_dir = extracted.bag_dir.clone();
        assert!(bag_dir.is_dir());

        let result = run_blocking(
            || std::thread::sleep(Duration::from_millis(500)),
            Some(Duration::from_millis(20)),
            Some(extracted),
        )
        .await
        .unwrap();

        assert!(result.is_none());
        assert!(!bag_dir.exists());
    }

    #[tokio::test]
    async fn finished_run_returns_its_value_and_removes_the_bag() {
        let dir = tempfile::tempdir().unwrap();
        let extracted = extracted_bag(dir.path());
        let bag_dir = extracted.bag_dir.clone();

        let result = run_blocking(|| 7, Some(Duration::from_secs(30)), Some(extracted))
            .await
            .unwrap();

        assert_eq!(result, Some(7));
        assert!(!bag_dir.exists());
    }

    #[test]
    fn rejections_and_internal_errors_map_to_distinct_codes() {
        let not_found = ValidateError::BagNotFound {
            path: PathBuf::from("/nope"),
        };
        let no_context = ValidateError::ContextUnavailable {
            context: ValidationContext::WithExternalContext,
        };
        let engine = ValidateError::Engine(EngineError::NoProgress {
            remaining: vec!["1".into()],
        });

        assert_eq!(exit_code_for(&not_found), exit_codes::REJECTED);
        assert_eq!(exit_code_for(&no_context), exit_codes::REJECTED);
        assert_eq!(exit_code_for(&engine), exit_codes::INTERNAL_ERROR);
    }
}
