//! JSON handling for group records

use crate::data::GroupRecord;
use crate::error::PlanError;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Load hub groups from a JSON array of group records
pub fn load_groups(path: impl AsRef<Path>) -> Result<Vec<GroupRecord>, PlanError> {
    let path = path.as_ref();
    log::info!("Reading group file: {}", path.display());

    let reader = BufReader::new(File::open(path)?);
    let groups: Vec<GroupRecord> = serde_json::from_reader(reader)?;

    log::info!(
        "Loaded {} groups with {} terminals in total",
        groups.len(),
        groups.iter().map(|g| g.terminals.len()).sum::<usize>()
    );

    Ok(groups)
}

/// Write hub groups as a pretty-printed JSON array
pub fn save_groups(path: impl AsRef<Path>, groups: &[GroupRecord]) -> Result<(), PlanError> {
    let path = path.as_ref();
    log::info!("Writing {} groups to {}", groups.len(), path.display());

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, groups)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Site;

    #[test]
    fn groups_survive_a_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groups.json");
        let groups = vec![GroupRecord::new(
            Site::new(1, 0.0, 0.0, 30.0),
            vec![Site::new(2, 3.0, 4.0, 1.0), Site::new(7, -1.0, 2.0, 6.0)],
        )];

        save_groups(&path, &groups).unwrap();
        assert_eq!(load_groups(&path).unwrap(), groups);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_groups(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, PlanError::Io(_)));
    }
}
