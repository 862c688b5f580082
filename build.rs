use std::fs::File;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use flate2::write::GzEncoder;
use flate2::Compression;

const SKELETON_DIR: &str = "res";
const SKELETON_ARCHIVE: &str = "res.tar.gz";

/// Packs the site skeleton so `podium-tool bootstrap` can embed it with `include_bytes!`.
fn pack_skeleton(src_dir: &Path, archive_path: &Path) -> io::Result<()> {
    let _ = fs::remove_file(archive_path);

    let tar_gz = File::create(archive_path)?;
    let enc = GzEncoder::new(tar_gz, Compression::best());
    let mut tar = tar::Builder::new(enc);
    tar.follow_symlinks(true);
    tar.append_dir_all(".", src_dir)?;
    tar.into_inner()?.finish()?;
    Ok(())
}

fn main() {
    println!("cargo:rerun-if-changed={}", SKELETON_DIR);

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo");
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");

    let src_dir = PathBuf::from(manifest_dir).join(SKELETON_DIR);
    let archive_path = PathBuf::from(out_dir).join(SKELETON_ARCHIVE);

    if let Err(e) = pack_skeleton(&src_dir, &archive_path) {
        panic!("Could not pack {} into {}: {}", src_dir.display(), archive_path.display(), e);
    }
}
