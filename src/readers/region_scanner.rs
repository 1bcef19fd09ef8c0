use crate::error::Result;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// A region subdirectory and the data files found directly inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionDirectory {
    pub name: String,
    pub path: PathBuf,
    pub data_files: Vec<PathBuf>,
    /// Names of files in the directory that are not observation files
    pub skipped_files: Vec<String>,
}

/// Everything found under an input root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionScan {
    pub regions: Vec<RegionDirectory>,
    /// Entries that could not be read; their siblings are still scanned
    pub unreadable: Vec<PathBuf>,
}

/// Locates region directories and their observation files under a root.
///
/// Directories and files are visited in file-name order so that repeated
/// runs over the same tree fold rows in the same sequence. Symlinked data
/// files are read through their target.
pub struct RegionScanner {
    region_pattern: Regex,
    file_pattern: Regex,
}

impl RegionScanner {
    pub fn new(region_pattern: &str, file_pattern: &str) -> Result<Self> {
        Ok(Self {
            region_pattern: Regex::new(region_pattern)?,
            file_pattern: Regex::new(file_pattern)?,
        })
    }

    /// Only an unreadable `root` is an error
    pub fn scan(&self, root: &Path) -> Result<RegionScan> {
        let mut scan = RegionScan::default();

        for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => {
                    scan.record_unreadable(root, &e);
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }

            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if !self.region_pattern.is_match(name) {
                continue;
            }

            let region = self.scan_region(name, entry.path(), &mut scan);
            scan.regions.push(region);
        }

        Ok(scan)
    }

    fn scan_region(&self, name: &str, path: &Path, scan: &mut RegionScan) -> RegionDirectory {
        let mut data_files = Vec::new();
        let mut skipped_files = Vec::new();

        for entry in WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    scan.record_unreadable(path, &e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            if self.file_pattern.is_match(&file_name) {
                data_files.push(entry.path().to_path_buf());
            } else {
                skipped_files.push(file_name.into_owned());
            }
        }

        RegionDirectory {
            name: name.to_string(),
            path: path.to_path_buf(),
            data_files,
            skipped_files,
        }
    }
}

impl RegionScan {
    fn record_unreadable(&mut self, parent: &Path, error: &walkdir::Error) {
        let path = error.path().unwrap_or(parent).to_path_buf();
        warn!(path = %path.display(), error = %error, "Skipping unreadable entry");
        self.unreadable.push(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::{DEFAULT_DATA_FILE_PATTERN, DEFAULT_REGION_PATTERN};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_finds_regions_in_name_order() -> Result<()> {
        let root = TempDir::new()?;
        for region in ["region2", "region1", "archive"] {
            fs::create_dir(root.path().join(region))?;
        }
        fs::write(root.path().join("region2/donnees_region2_2020.csv"), "")?;
        fs::write(root.path().join("region1/donnees_region1_2021.csv"), "")?;
        fs::write(root.path().join("region1/donnees_region1_2020.csv"), "")?;
        fs::write(root.path().join("region1/README.txt"), "")?;
        fs::write(root.path().join("archive/donnees_region9.csv"), "")?;

        let scanner = RegionScanner::new(DEFAULT_REGION_PATTERN, DEFAULT_DATA_FILE_PATTERN)?;
        let regions = scanner.scan(root.path())?.regions;

        let names: Vec<&str> = regions.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["region1", "region2"]);

        let files: Vec<String> = regions[0]
            .data_files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            files,
            vec!["donnees_region1_2020.csv", "donnees_region1_2021.csv"]
        );
        assert_eq!(regions[0].skipped_files, vec!["README.txt"]);
        assert_eq!(regions[1].data_files.len(), 1);
        Ok(())
    }

    #[test]
    fn test_nested_region_directories_are_found() -> Result<()> {
        let root = TempDir::new()?;
        fs::create_dir_all(root.path().join("2020/region3"))?;
        fs::write(root.path().join("2020/region3/donnees_region3.csv"), "")?;

        let scanner = RegionScanner::new(DEFAULT_REGION_PATTERN, DEFAULT_DATA_FILE_PATTERN)?;
        let regions = scanner.scan(root.path())?.regions;

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].name, "region3");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_data_file_is_listed() -> Result<()> {
        let root = TempDir::new()?;
        fs::create_dir(root.path().join("region1"))?;
        fs::write(root.path().join("donnees_2020.csv"), "")?;
        std::os::unix::fs::symlink(
            root.path().join("donnees_2020.csv"),
            root.path().join("region1/donnees_region1.csv"),
        )?;

        let scanner = RegionScanner::new(DEFAULT_REGION_PATTERN, DEFAULT_DATA_FILE_PATTERN)?;
        let scan = scanner.scan(root.path())?;

        assert_eq!(scan.regions.len(), 1);
        assert_eq!(
            scan.regions[0].data_files,
            vec![root.path().join("region1/donnees_region1.csv")]
        );
        assert!(scan.unreadable.is_empty());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_entry_does_not_hide_siblings() -> Result<()> {
        let root = TempDir::new()?;
        for region in ["region1", "region2"] {
            fs::create_dir(root.path().join(region))?;
        }
        std::os::unix::fs::symlink(
            root.path().join("gone.csv"),
            root.path().join("region1/donnees_region1_a.csv"),
        )?;
        fs::write(root.path().join("region1/donnees_region1_b.csv"), "")?;
        fs::write(root.path().join("region2/donnees_region2.csv"), "")?;

        let scanner = RegionScanner::new(DEFAULT_REGION_PATTERN, DEFAULT_DATA_FILE_PATTERN)?;
        let scan = scanner.scan(root.path())?;

        assert_eq!(scan.regions.len(), 2);
        assert_eq!(scan.regions[0].data_files.len(), 1);
        assert_eq!(scan.regions[1].data_files.len(), 1);
        assert_eq!(
            scan.unreadable,
            vec![root.path().join("region1/donnees_region1_a.csv")]
        );
        Ok(())
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let scanner =
            RegionScanner::new(DEFAULT_REGION_PATTERN, DEFAULT_DATA_FILE_PATTERN).unwrap();
        assert!(scanner.scan(Path::new("/definitely/not/here")).is_err());
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(RegionScanner::new("region(", DEFAULT_DATA_FILE_PATTERN).is_err());
    }
}
