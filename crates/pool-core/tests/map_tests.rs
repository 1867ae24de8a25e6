//! Tests for pool maps and for loading documents of either kind

use pool_core::{Error, LoadedConfig, PoolConfigLoader, PoolConfigMap};
use pool_meta::Provider;
use pool_test_utils::PoolTree;
use pool_test_utils::fixtures::BASE_POOL;
use pretty_assertions::assert_eq;

fn tree_with_targets() -> PoolTree {
    let tree = PoolTree::new();
    tree.write_pool("base", BASE_POOL);
    tree.write_pool("linux", "name: Linux fuzzing\nparents: [base]\n");
    tree.write_pool("asan", "name: ASan fuzzing\nparents: [base]\ntasks: 5\n");
    tree
}

mod maps {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn map_expands_onto_every_target() {
        let tree = tree_with_targets();
        tree.write_pool(
            "nightly",
            "name: nightly\napply_to: [linux, asan]\ncommand: [nightly.sh]\n",
        );

        let map = PoolConfigMap::load(tree.root(), "nightly").unwrap();
        assert_eq!(map.pool_id(), "nightly");
        assert_eq!(map.name(), "nightly");
        assert_eq!(map.apply_to(), ["linux", "asan"]);
        assert_eq!(map.shared().cloud, Provider::Aws);
        assert_eq!(map.shared().cycle_time, 12 * 3600);

        let pools: Vec<_> = map.iter_pools().collect::<Result<_, _>>().unwrap();
        let ids: Vec<&str> = pools.iter().map(|p| p.pool_id.as_str()).collect();
        let names: Vec<&str> = pools.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(ids, vec!["linux/nightly", "asan/nightly"]);
        assert_eq!(names, vec!["Linux fuzzing (nightly)", "ASan fuzzing (nightly)"]);

        assert_eq!(pools[0].parents, vec!["linux"]);
        assert_eq!(pools[0].command, vec!["nightly.sh"]);
        assert_eq!(pools[0].tasks, 3);
        assert_eq!(pools[1].tasks, 5);
    }

    #[test]
    fn map_fields_override_target() {
        let tree = tree_with_targets();
        tree.write_pool(
            "big",
            "name: big\napply_to: [linux, asan]\ndisk_size: 250g\nmacros:\n  EXTRA: on-map\n",
        );

        let map = PoolConfigMap::load(tree.root(), "big").unwrap();
        let pool = map.apply("linux").unwrap();
        assert_eq!(pool.disk_size, 250);
        assert_eq!(pool.macros["EXTRA"], "on-map");
        assert_eq!(pool.macros["ENVIRONMENT"], "production");
        assert_eq!(map.shared().disk_size, 250);
    }

    #[test]
    fn differing_shared_field_is_rejected() {
        let tree = tree_with_targets();
        tree.write_pool("gcp", "name: GCP fuzzing\nparents: [base]\ncloud: gcp\n");
        tree.write_pool("mixed", "name: mixed\napply_to: [linux, gcp]\n");

        let err = PoolConfigMap::load(tree.root(), "mixed").unwrap_err();
        assert!(matches!(err, Error::Consistency { .. }));
        assert!(err.to_string().contains("cloud has multiple values"), "{err}");
    }

    #[test]
    fn differing_unshared_field_is_allowed() {
        let tree = tree_with_targets();
        tree.write_pool("both", "name: both\napply_to: [linux, asan]\n");

        assert!(PoolConfigMap::load(tree.root(), "both").is_ok());
    }

    #[test]
    fn target_with_preprocess_is_rejected() {
        let tree = tree_with_targets();
        tree.write_pool("prepped", "name: prepped\nparents: [base]\npreprocess: setup\n");
        tree.write_pool("map", "name: map\napply_to: [prepped]\n");

        let err = PoolConfigMap::load(tree.root(), "map").unwrap_err();
        assert!(err.to_string().contains("preprocess cannot be defined"), "{err}");
    }

    #[test]
    fn empty_apply_to_is_rejected() {
        let tree = tree_with_targets();
        tree.write_pool("nothing", "name: nothing\napply_to: []\n");

        let err = PoolConfigMap::load(tree.root(), "nothing").unwrap_err();
        assert!(matches!(err, Error::Consistency { .. }));
    }

    #[test]
    fn map_cannot_declare_parents() {
        let tree = tree_with_targets();
        tree.write_pool("odd", "name: odd\napply_to: [linux]\nparents: [base]\n");

        let err = PoolConfigMap::load(tree.root(), "odd").unwrap_err();
        assert!(matches!(err, Error::Meta(pool_meta::Error::Schema { .. })));
    }

    #[test]
    fn missing_target_is_reported() {
        let tree = tree_with_targets();
        tree.write_pool("lost", "name: lost\napply_to: [linux, missing]\n");

        let err = PoolConfigMap::load(tree.root(), "lost").unwrap_err();
        assert!(matches!(err, Error::Fs(_)));
    }

    #[test]
    fn disk_size_too_large_for_bytes_is_rejected() {
        let tree = tree_with_targets();
        tree.write_pool("huge", "name: huge\napply_to: [linux]\ndisk_size: 20000000000g\n");

        let err = PoolConfigMap::load(tree.root(), "huge").unwrap_err();
        match err {
            Error::InvalidValue { field, .. } => assert_eq!(field, "disk_size"),
            other => panic!("expected invalid value, got {other:?}"),
        }
    }
}

mod loader {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pool_document_loads_as_pool() {
        let tree = tree_with_targets();

        let loaded = PoolConfigLoader::from_file(&tree.path("linux")).unwrap();
        assert_eq!(loaded.pool_id(), "linux");
        match loaded {
            LoadedConfig::Pool(pool) => assert_eq!(pool.name, "Linux fuzzing"),
            other => panic!("expected pool, got {other:?}"),
        }
    }

    #[test]
    fn map_document_loads_as_map() {
        let tree = tree_with_targets();
        let path = tree.write_pool("nightly", "name: nightly\napply_to: [linux, asan]\n");

        let loaded = PoolConfigLoader::from_file(&path).unwrap();
        assert!(matches!(loaded, LoadedConfig::Map(_)));
        assert_eq!(loaded.pools().unwrap().len(), 2);
    }

    #[test]
    fn pool_loads_as_single_pool_list() {
        let tree = tree_with_targets();

        let loaded = PoolConfigLoader::from_file(&tree.path("base")).unwrap();
        let pools = loaded.pools().unwrap();
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].pool_id, "base");
    }

    #[test]
    fn document_without_name_is_unidentifiable() {
        let tree = PoolTree::new();
        let path = tree.write_pool("anonymous", "cloud: aws\n");

        let err = PoolConfigLoader::from_file(&path).unwrap_err();
        match err {
            Error::Unidentifiable { keys, pool_required, map_required, .. } => {
                assert_eq!(keys, vec!["cloud"]);
                assert_eq!(pool_required, vec!["name"]);
                assert_eq!(map_required, vec!["apply_to", "name"]);
            }
            other => panic!("expected unidentifiable, got {other:?}"),
        }
    }

    #[test]
    fn document_with_parents_and_apply_to_is_unidentifiable() {
        let tree = tree_with_targets();
        let path = tree.write_pool("both", "name: both\nparents: [base]\napply_to: [linux]\n");

        let err = PoolConfigLoader::from_file(&path).unwrap_err();
        assert!(matches!(err, Error::Unidentifiable { .. }));
        assert!(err.to_string().contains("could not be identified"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let tree = PoolTree::new();

        let err = PoolConfigLoader::from_file(&tree.path("absent")).unwrap_err();
        assert!(matches!(err, Error::Fs(pool_fs::Error::Io { .. })));
    }
}
