use std::env;
use std::path::PathBuf;

use podium::config::CFG_FILE_NAME;

fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Some(exe_dir) = env::current_exe().ok().and_then(|exe| exe.parent().map(PathBuf::from)) {
        dirs.push(exe_dir);
    }
    if let Ok(cur_dir) = env::current_dir() {
        dirs.push(cur_dir);
    }
    if let Some(cfg_dir) = dirs::config_dir() {
        dirs.push(cfg_dir);
    }

    dirs
}

/// The explicit path when one is given, otherwise the first `podium.toml` found next to
/// the executable, in the current folder or in the user configuration folder.
pub(crate) fn find_config(cfg_path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(cfg_path) = cfg_path {
        return Some(cfg_path);
    }

    candidate_dirs()
        .into_iter()
        .map(|dir| dir.join(CFG_FILE_NAME))
        .find(|path| path.is_file())
}
