use crate::error::{Error, Result};
use std::path::Path;
use tokio::fs;

pub const DEFAULT_LINKS_FILE: &str = "links.txt";

/// Reads one URL per line, skipping blank lines and `#` comments.
pub async fn load_links(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(Error::custom(format!(
            "Links file not found: {}",
            path.display()
        )));
    }

    let content = fs::read_to_string(path).await?;
    Ok(parse_links(&content))
}

pub fn parse_links(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_lines_and_comments() {
        let links = parse_links(
            "# weekly batch\nhttps://www.tiktok.com/@a/video/1\n\n   \n  https://youtube.com/shorts/xyz  \n#https://skipped\n",
        );
        assert_eq!(
            links,
            vec!["https://www.tiktok.com/@a/video/1", "https://youtube.com/shorts/xyz"]
        );
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_links(&dir.path().join("links.txt")).await.is_err());
    }

    #[tokio::test]
    async fn reads_links_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.txt");
        std::fs::write(&path, "https://a.example/v/1\n").unwrap();

        assert_eq!(load_links(&path).await.unwrap(), vec!["https://a.example/v/1"]);
    }
}
