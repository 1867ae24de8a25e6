//! Canned documents used across crate test suites.

/// A pool setting every field a resolved pool needs.
///
/// 8 cores per task with 4 GB each, on AWS x64, one task every 12 hours.
pub const BASE_POOL: &str = r#"name: base
cloud: aws
command: [run.sh]
container: mozillasecurity/fuzzer:latest
cores_per_task: 8
cpu: x64
cycle_time: 12h
disk_size: 120g
imageset: generic-worker
max_run_time: 4h
metal: false
minimum_memory_per_core: 4g
platform: linux
preprocess: ""
run_as_admin: false
scopes: [queue:create-task]
tasks: 3
macros:
  ENVIRONMENT: production
"#;

/// AWS and GCP x64 machines with a few core and memory shapes.
pub const MACHINES: &str = r#"aws:
  x64:
    c5.2xlarge:
      cpu: 8
      ram: 16
    m5.2xlarge:
      cpu: 8
      ram: 32
    r5.2xlarge:
      cpu: 8
      ram: 64
      zone_blacklist: [us-east-1e]
    m5.4xlarge:
      cpu: 16
      ram: 64
    m5.metal:
      cpu: 96
      ram: 384
      metal: true
gcp:
  x64:
    n2-standard-8:
      cpu: 8
      ram: 32
"#;
