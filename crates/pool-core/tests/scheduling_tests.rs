//! Tests for machine candidates and cron schedules of resolved pools

use chrono::{TimeZone, Utc};
use pool_core::{Error, PoolConfiguration, PoolResolver};
use pool_meta::MachineCatalog;
use pool_test_utils::PoolTree;
use pool_test_utils::fixtures::{BASE_POOL, MACHINES};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn resolve_child(overrides: &str) -> (PoolTree, PoolConfiguration) {
    let tree = PoolTree::new();
    tree.write_pool("base", BASE_POOL);
    tree.write_pool("child", &format!("name: child\nparents: [base]\n{overrides}"));
    let pool = PoolResolver::new(tree.root()).resolve("child").unwrap();
    (tree, pool)
}

mod machines {
    use super::*;
    use pretty_assertions::assert_eq;

    fn catalog() -> MachineCatalog {
        MachineCatalog::parse(MACHINES).unwrap()
    }

    #[test]
    fn candidates_match_cores_and_memory() {
        let (_tree, pool) = resolve_child("");

        let candidates = pool.machine_candidates(&catalog()).unwrap();
        let names: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["m5.2xlarge", "r5.2xlarge"]);
        assert!(candidates.iter().all(|c| c.capacity == 1));
        assert!(candidates[0].zone_blacklist.is_empty());
        assert!(candidates[1].zone_blacklist.contains("us-east-1e"));
    }

    #[rstest]
    #[case("minimum_memory_per_core: 8g\n", vec!["r5.2xlarge"])]
    #[case("cloud: gcp\n", vec!["n2-standard-8"])]
    #[case("cores_per_task: 16\n", vec!["m5.4xlarge"])]
    fn candidates_follow_pool_shape(#[case] overrides: &str, #[case] expected: Vec<&str>) {
        let (_tree, pool) = resolve_child(overrides);

        let candidates = pool.machine_candidates(&catalog()).unwrap();
        let names: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, expected);
    }

    #[rstest]
    #[case("metal: true\n")]
    #[case("cpu: arm64\n")]
    #[case("minimum_memory_per_core: 16g\n")]
    fn unmatched_shape_is_error(#[case] overrides: &str) {
        let (_tree, pool) = resolve_child(overrides);

        let err = pool.machine_candidates(&catalog()).unwrap_err();
        assert!(matches!(err, Error::NoMachineMatch { .. }));
        assert!(err.to_string().contains("child"));
    }

    #[test]
    fn catalog_loads_from_tree() {
        let tree = PoolTree::new();
        let path = tree.write_machines(MACHINES);

        let catalog = MachineCatalog::from_file(&path).unwrap();
        let (_tree, pool) = resolve_child("");
        assert_eq!(pool.machine_candidates(&catalog).unwrap().len(), 2);
    }
}

mod schedules {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn schedule_start_anchors_crons() {
        let (_tree, pool) = resolve_child("schedule_start: 2024-01-01T00:00:00Z\n");

        let crons: Vec<String> = pool.schedule_crons().iter().map(ToString::to_string).collect();
        assert_eq!(crons, vec!["0 0 12 * * *", "0 0 0 * * *"]);
    }

    #[test]
    fn schedule_start_offset_is_converted_to_utc() {
        let (_tree, pool) = resolve_child("schedule_start: 2024-01-01T02:30:00+02:00\n");

        let crons: Vec<String> = pool.schedule_crons().iter().map(ToString::to_string).collect();
        assert_eq!(crons, vec!["0 30 12 * * *", "0 30 0 * * *"]);
    }

    #[test]
    fn unset_schedule_start_uses_now() {
        let (_tree, pool) = resolve_child("cycle_time: 8h\n");
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 1, 15, 0).unwrap();

        let crons: Vec<String> = pool
            .schedule_crons_from(now)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(crons, vec!["0 15 9 * * *", "0 15 17 * * *", "0 15 1 * * *"]);
    }

    #[test]
    fn schedule_start_is_inherited() {
        let tree = PoolTree::new();
        tree.write_pool("base", BASE_POOL);
        tree.write_pool("timed", "name: timed\nparents: [base]\nschedule_start: 2024-06-01\n");
        tree.write_pool("child", "name: child\nparents: [timed]\n");

        let pool = PoolResolver::new(tree.root()).resolve("child").unwrap();
        let start = pool.schedule_start.expect("inherited schedule start");
        assert_eq!(start.to_rfc3339(), "2024-06-01T00:00:00+00:00");
    }

    #[test]
    fn resolved_pool_serializes_without_base_dir() {
        let (_tree, pool) = resolve_child("");

        let json = serde_json::to_value(&pool).unwrap();
        assert_eq!(json["pool_id"], "child");
        assert_eq!(json["cloud"], "aws");
        assert_eq!(json["cpu"], "x64");
        assert_eq!(json["disk_size"], 120);
        assert!(json.get("base_dir").is_none());
    }
}
