use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use lazy_static::lazy_static;
use regex::Regex;

use podium::config::CFG_FILE_NAME;
use podium::util::os_helper::get_name;

use crate::BootstrapArgs;
use crate::decompress::decompress_files;

lazy_static! {
    static ref AUTHOR_REGEX: Regex = Regex::new(r#"(?m)^author = ".*"$"#).unwrap();
}

fn get_sample_cfg() -> &'static str {
    include_str!("../../../podium.toml")
}

fn replace_author(config_data: &str, author: &str) -> String {
    let author = author.replace('\\', "\\\\").replace('"', "\\\"");
    let line = format!("author = \"{}\"", author);
    AUTHOR_REGEX.replace(config_data, regex::NoExpand(&line)).to_string()
}

fn write_podium_cfg(out_dir: &Path) -> Result<()> {
    let file = File::create(out_dir.join(CFG_FILE_NAME))?;
    let mut writer = BufWriter::new(file);

    let sample_cfg = replace_author(get_sample_cfg(), &get_name());
    writer.write_all(sample_cfg.as_bytes())?;

    writer.flush()?;
    Ok(())
}

pub fn bootstrap_cmd(args: BootstrapArgs) -> Result<()> {
    let out_path = fs::canonicalize(&args.out_dir)
        .with_context(|| format!("Error converting path to absolute: {}", args.out_dir))?;

    if !out_path.is_dir() {
        bail!("Output path must be a directory: {}", out_path.display());
    }

    decompress_files(&out_path).context("Error bootstrapping")?;
    write_podium_cfg(&out_path).context("Error writing Podium configuration")?;

    println!("New site created in {}", out_path.display());
    println!("Run podium --config-path {}", out_path.join(CFG_FILE_NAME).display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use podium::config::parse_config;

    use super::*;

    #[test]
    fn test_sample_cfg() {
        let res = replace_author(get_sample_cfg(), "Ana \"the\" Writer");
        assert!(res.contains(r#"author = "Ana \"the\" Writer""#));

        let cfg = parse_config(&res).unwrap();
        assert_eq!(cfg.site.author, "Ana \"the\" Writer");
    }

    #[test]
    fn test_bootstrap_dir() {
        let dir = tempfile::tempdir().unwrap();
        bootstrap_cmd(BootstrapArgs { out_dir: dir.path().to_string_lossy().to_string() }).unwrap();
        assert!(dir.path().join(CFG_FILE_NAME).is_file());
        assert!(dir.path().join("static").join("about.md").is_file());
    }
}
