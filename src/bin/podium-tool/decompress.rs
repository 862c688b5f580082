use std::io;
use std::path::Path;

use flate2::read::GzDecoder;
use tar::Archive;

const SKELETON: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/res.tar.gz"));

/// Unpacks the embedded site skeleton (templates, assets, sample content) into `output`.
pub fn decompress_files(output: &Path) -> io::Result<()> {
    let tar = GzDecoder::new(SKELETON);
    let mut archive = Archive::new(tar);
    archive.unpack(output)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncompress() {
        let dir = tempfile::tempdir().unwrap();
        decompress_files(dir.path()).unwrap();
        assert!(dir.path().join("templates").join("layout.tpl").is_file());
        assert!(dir.path().join("assets").join("style.css").is_file());
        assert!(dir.path().join("posts").join("welcome.md").is_file());
    }

    #[test]
    fn test_post_template_has_share_buttons() {
        let dir = tempfile::tempdir().unwrap();
        decompress_files(dir.path()).unwrap();
        assert!(dir.path().join("assets").join("share-buttons.js").is_file());

        let post_tpl = std::fs::read_to_string(dir.path().join("templates").join("post.tpl")).unwrap();
        assert!(post_tpl.contains(r#"<script src="/assets/share-buttons.js"></script>"#));
        for kind in ["twitter", "linkedin", "facebook", "reddit", "email", "copy"] {
            assert!(post_tpl.contains(&format!(r#"data-share="{}""#, kind)));
        }
    }
}
