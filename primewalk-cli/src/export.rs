use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use primewalk::checkpoint::{CaseTrack, Snapshot};
use primewalk::state::Dimensions;
use primewalk::store::ColorTag;
use serde::Serialize;

/// Column-oriented view of one case, ready for a plotting tool.
#[derive(Serialize)]
struct CasePoints<'a> {
    case: &'a str,
    cursor: i64,
    dimensions: Dimensions,
    xs: &'a [i64],
    ys: &'a [i64],
    #[serde(skip_serializing_if = "Option::is_none")]
    zs: Option<&'a [i64]>,
    colors: &'a [ColorTag],
    #[serde(skip_serializing_if = "<[u32]>::is_empty")]
    lifetimes: &'a [u32],
}

impl<'a> CasePoints<'a> {
    fn new(track: &'a CaseTrack, snapshot: &Snapshot) -> Self {
        let store = &track.store;
        Self {
            case: &track.id,
            cursor: snapshot.cursor,
            dimensions: snapshot.dimensions,
            xs: store.xs(),
            ys: store.ys(),
            zs: (snapshot.dimensions == Dimensions::Spatial).then(|| store.zs()),
            colors: store.colors(),
            lifetimes: store.lifetimes(),
        }
    }
}

/// Writes `<dir>/<case>.json` for every case. Returns the written paths.
pub fn export_snapshot(snapshot: &Snapshot, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let mut written = Vec::with_capacity(snapshot.cases.len());
    for track in &snapshot.cases {
        let path = dir.join(format!("{}.json", track.id));
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &CasePoints::new(track, snapshot))?;
        writer.flush()?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use primewalk::state::{CaseState, Point};
    use primewalk::store::{PointStore, StoreMode};

    #[test]
    fn writes_one_file_per_case() {
        let mut store = PointStore::new(StoreMode::new(true, None).unwrap());
        store.record(Point::ORIGIN, ColorTag::NoTurn).unwrap();
        store.record(Point::planar(0, 1), ColorTag::Turn).unwrap();
        let snapshot = Snapshot {
            cursor: 2,
            start: 0,
            dimensions: Dimensions::Planar,
            cases: vec![
                CaseTrack { id: "c1".into(), state: CaseState::new(), store: store.clone() },
                CaseTrack { id: "c5".into(), state: CaseState::new(), store },
            ],
        };
        let dir = tempfile::tempdir().unwrap();
        let written = export_snapshot(&snapshot, dir.path()).unwrap();
        assert_eq!(written.len(), 2);

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&written[1]).unwrap()).unwrap();
        assert_eq!(json["case"], "c5");
        assert_eq!(json["ys"], serde_json::json!([0, 1]));
        assert_eq!(json["colors"], serde_json::json!(["no_turn", "turn"]));
        assert!(json.get("zs").is_none());
        assert!(json.get("lifetimes").is_none());
    }
}
