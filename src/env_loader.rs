use std::env;
use std::path::PathBuf;

fn fallback_dotenv_path(data_dir: Option<PathBuf>) -> Option<PathBuf> {
    Some(data_dir?.join(".env"))
}

pub fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let fallback = fallback_dotenv_path(env::var_os("TALLY_DATA_DIR").map(PathBuf::from));

    let Some(path) = fallback else {
        return;
    };
    if path.is_file() {
        let _ = dotenvy::from_path(&path);
    }
}
