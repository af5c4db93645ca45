use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct TallyPaths {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub catalog_file: PathBuf,
    pub bundle_file: PathBuf,
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

pub fn resolve_paths() -> TallyPaths {
    let input_dir = env_or_default_path("TALLY_INPUT_DIR", PathBuf::from("input"));
    let output_dir = env_or_default_path("TALLY_OUTPUT_DIR", PathBuf::from("output"));
    let data_dir = env_or_default_path("TALLY_DATA_DIR", PathBuf::from("data"));

    let catalog_file = env_or_default_path("TALLY_CATALOG_FILE", data_dir.join("projects.json"));
    let bundle_file = env_or_default_path("TALLY_BUNDLE_FILE", output_dir.join("parsed_stats.json"));

    TallyPaths {
        input_dir,
        output_dir,
        catalog_file,
        bundle_file,
    }
}
