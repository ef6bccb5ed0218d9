//! Output file naming.

use std::path::{Path, PathBuf};

/// Build the export stem `{project}-{metric}` or `{project}-{metric}-{suffix}`
pub fn output_stem(project: &str, metric: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        format!("{}-{}", project, metric)
    } else {
        format!("{}-{}-{}", project, metric, suffix)
    }
}

/// Resolve the stem to a full path with the given extension
pub fn output_path(dir: &Path, stem: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}.{}", stem, extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_stem() {
        assert_eq!(output_stem("sae-rand-exp", "corr", ""), "sae-rand-exp-corr");
        assert_eq!(output_stem("sae-rand-exp", "corr", "96"), "sae-rand-exp-corr-96");
    }

    #[test]
    fn test_output_path() {
        let path = output_path(Path::new("plots"), "proj-corr", "svg");
        assert_eq!(path, PathBuf::from("plots/proj-corr.svg"));
    }
}
