use assert_matches::assert_matches;
use chrono::Duration;

use grib_mirror::config::ConfigLoader;
use grib_mirror::domain::QuantizePolicy;
use grib_mirror::error::MirrorError;

#[test]
fn resolve_reads_config_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("grib-mirror.json");
    std::fs::write(
        &path,
        r#"{
            "schema_version": 1,
            "datasets": [
                {
                    "name": "gfs-archive",
                    "root_dir": "/data/gfs",
                    "remote_host": "archive.example.org",
                    "credential": "ops@example.org",
                    "cycle_interval_seconds": 21600,
                    "valid_outlooks": [0, 3, 6],
                    "remote_template": "/pub/gfs.{yyyy}{mm}{dd}{hh}/gfs.t{hh}z.pgrb2f{ff}",
                    "local_template": "{yyyy}/{yyyy}{mm}{dd}/gfs_{yyyy}{mm}{dd}_{hh}00_0{ff}.grb2",
                    "quantize_policy": "floor"
                }
            ]
        }"#,
    )
    .unwrap();

    let resolved = ConfigLoader::resolve(Some(path.to_str().unwrap())).unwrap();
    let profile = resolved.find("gfs-archive").unwrap();
    assert_eq!(profile.cycle_interval, Duration::hours(6));
    assert_eq!(profile.quantize_policy, QuantizePolicy::Floor);
    assert_eq!(profile.valid_outlooks.len(), 3);
}

#[test]
fn explicit_config_path_must_exist() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("absent.json");

    let err = ConfigLoader::resolve(Some(path.to_str().unwrap())).unwrap_err();
    assert_matches!(err, MirrorError::ConfigRead(_));
}

#[test]
fn outlook_above_two_digits_fails_parse() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("grib-mirror.json");
    std::fs::write(
        &path,
        r#"{
            "datasets": [
                {
                    "name": "wide",
                    "root_dir": "/data/wide",
                    "remote_host": "archive.example.org",
                    "cycle_interval_seconds": 3600,
                    "valid_outlooks": [0, 120],
                    "remote_template": "/pub/{yyyy}{mm}{dd}/f{ff}",
                    "local_template": "{yyyy}/f{ff}.grb2"
                }
            ]
        }"#,
    )
    .unwrap();

    let err = ConfigLoader::resolve(Some(path.to_str().unwrap())).unwrap_err();
    assert_matches!(err, MirrorError::ConfigParse(_));
}
