//! Layered folder scanning and bounded freshness checks against a real
//! directory fixture.
//!
//! Base root (`bundle/`):
//!   Resources/folder_to_track/{test.txt, test.xml}
//!   Resources/folder_to_track/sub/{test.txt, test.yml}
//!   Resources/folder_to_track/sub/sub1/{test.txt, test.xml}
//! Override root (`app/`):
//!   Resources/folder_to_track/test.xml
//!   Resources/folder_to_track/sub/test.txt
//!   Resources/folder_to_track/sub/sub1/test.xml

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use filetime::{set_file_mtime, FileTime};
use strata_resource::{
    ByFileNameMatcher, CacheState, CumulativeResource, FolderContent, FolderContentLoader,
    Resource, ResourceRoot,
};

const RELATIVE: &str = "Resources/folder_to_track";
const GROUP: &str = "TestBundle1";
const FIXTURE_MTIME: i64 = 1_000_000;

struct Fixture {
    _dir: tempfile::TempDir,
    base: PathBuf,
    app: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("bundle");
        let app = dir.path().join("app");
        for file in [
            "test.txt",
            "test.xml",
            "sub/test.txt",
            "sub/test.yml",
            "sub/sub1/test.txt",
            "sub/sub1/test.xml",
        ] {
            write_old(&base.join(RELATIVE).join(file));
        }
        for file in ["test.xml", "sub/test.txt", "sub/sub1/test.xml"] {
            write_old(&app.join(RELATIVE).join(file));
        }
        Self {
            _dir: dir,
            base,
            app,
        }
    }

    fn base_file(&self, rel: &str) -> PathBuf {
        self.base.join(RELATIVE).join(rel)
    }

    fn app_file(&self, rel: &str) -> PathBuf {
        self.app.join(RELATIVE).join(rel)
    }
}

fn write_old(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, "content").unwrap();
    set_file_mtime(path, FileTime::from_unix_time(FIXTURE_MTIME, 0)).unwrap();
}

fn touch_new(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, "").unwrap();
}

fn set_mtime(path: &Path, time: SystemTime) {
    set_file_mtime(path, FileTime::from_system_time(time)).unwrap();
}

fn loader(patterns: &[&str], max_depth: i32, flat: bool) -> FolderContentLoader {
    FolderContentLoader::new(
        RELATIVE,
        max_depth,
        flat,
        ByFileNameMatcher::new(patterns.iter().copied()).unwrap(),
    )
}

fn tracking_loader() -> FolderContentLoader {
    loader(&["*.yml", "*.xml"], -1, true)
}

fn flat(content: &FolderContent) -> Vec<PathBuf> {
    match content {
        FolderContent::Flat(files) => files.clone(),
        FolderContent::Tree(_) => panic!("expected flat content"),
    }
}

fn sorted(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    paths
}

/// Registers the fixture, then returns the reference time used by checks:
/// one second after the newest tracked file.
fn register(fx: &Fixture, l: &FolderContentLoader) -> (CumulativeResource, SystemTime) {
    let mut resource = CumulativeResource::new("test_group");
    l.register_found_resource(GROUP, &fx.base, Some(&fx.app), &mut resource);
    let newest = resource
        .found_in_group(GROUP)
        .filter_map(|p| std::fs::metadata(p).ok()?.modified().ok())
        .max()
        .unwrap_or(SystemTime::UNIX_EPOCH);
    (resource, newest + Duration::from_secs(1))
}

/// Applies `mutate` to a freshly registered fixture and reports freshness.
fn fresh_after(mutate: impl FnOnce(&Fixture, SystemTime)) -> bool {
    let fx = Fixture::new();
    let l = tracking_loader();
    let (resource, load_time) = register(&fx, &l);
    assert!(
        l.is_resource_fresh(GROUP, &fx.base, Some(&fx.app), &resource, load_time),
        "fixture must be fresh before mutation"
    );
    mutate(&fx, load_time);
    l.is_resource_fresh(GROUP, &fx.base, Some(&fx.app), &resource, load_time)
}

// -- Loading --

#[test]
fn flat_load_with_override_root() {
    let fx = Fixture::new();
    let info = tracking_loader()
        .load(GROUP, &fx.base, Some(&fx.app))
        .unwrap();

    assert_eq!(info.name, "Folder content: Resources/folder_to_track");
    assert_eq!(info.path, fx.base.join(RELATIVE));
    assert_eq!(
        flat(&info.data),
        sorted(vec![
            fx.base_file("sub/test.yml"),
            fx.app_file("sub/sub1/test.xml"),
            fx.app_file("test.xml"),
        ])
    );
}

#[test]
fn flat_load_with_override_and_no_filter() {
    let fx = Fixture::new();
    let info = loader(&[], -1, true)
        .load(GROUP, &fx.base, Some(&fx.app))
        .unwrap();

    assert_eq!(
        flat(&info.data),
        sorted(vec![
            fx.base_file("sub/test.yml"),
            fx.base_file("sub/sub1/test.txt"),
            fx.base_file("test.txt"),
            fx.app_file("test.xml"),
            fx.app_file("sub/test.txt"),
            fx.app_file("sub/sub1/test.xml"),
        ])
    );
}

#[test]
fn override_file_replaces_base_file_at_same_relative_path() {
    let fx = Fixture::new();
    let l = tracking_loader();
    let info = l.load(GROUP, &fx.base, Some(&fx.app)).unwrap();
    let files = flat(&info.data);
    assert!(!files.contains(&fx.base_file("test.xml")));
    assert!(!files.contains(&fx.base_file("sub/sub1/test.xml")));

    let (resource, _) = register(&fx, &l);
    assert!(!resource.is_found(GROUP, &fx.base_file("test.xml")));
    assert!(resource.is_found(GROUP, &fx.app_file("test.xml")));
}

#[test]
fn depth_bound_with_override_root() {
    let fx = Fixture::new();

    let one = loader(&["*.yml", "*.xml"], 1, true)
        .load(GROUP, &fx.base, Some(&fx.app))
        .unwrap();
    assert_eq!(flat(&one.data), vec![fx.app_file("test.xml")]);

    let two = loader(&["*.yml", "*.xml"], 2, true)
        .load(GROUP, &fx.base, Some(&fx.app))
        .unwrap();
    assert_eq!(
        flat(&two.data),
        sorted(vec![fx.base_file("sub/test.yml"), fx.app_file("test.xml")])
    );
}

#[test]
fn raising_depth_never_drops_files() {
    let fx = Fixture::new();
    let mut previous: Vec<PathBuf> = Vec::new();
    for depth in 1..=4 {
        let files = flat(
            &loader(&[], depth, true)
                .load(GROUP, &fx.base, Some(&fx.app))
                .unwrap()
                .data,
        );
        assert!(previous.iter().all(|p| files.contains(p)), "depth {depth}");
        previous = files;
    }
}

#[test]
fn hierarchical_load_with_override_root() {
    let fx = Fixture::new();
    let info = loader(&["*.yml", "*.xml"], -1, false)
        .load(GROUP, &fx.base, Some(&fx.app))
        .unwrap();

    let FolderContent::Tree(tree) = info.data else {
        panic!("expected a tree");
    };
    assert_eq!(tree.files, vec![fx.app_file("test.xml")]);
    let sub = tree.get("sub").unwrap();
    assert_eq!(sub.files, vec![fx.base_file("sub/test.yml")]);
    assert_eq!(
        sub.get("sub1").unwrap().files,
        vec![fx.app_file("sub/sub1/test.xml")]
    );
}

#[test]
fn override_only_directory_is_scanned() {
    let fx = Fixture::new();
    std::fs::remove_dir_all(fx.base.join(RELATIVE)).unwrap();

    let info = tracking_loader()
        .load(GROUP, &fx.base, Some(&fx.app))
        .unwrap();
    assert_eq!(info.path, fx.app.join(RELATIVE));
    assert_eq!(
        flat(&info.data),
        sorted(vec![fx.app_file("sub/sub1/test.xml"), fx.app_file("test.xml")])
    );
}

// -- Freshness: base root --

#[test]
fn file_added_is_stale() {
    assert!(!fresh_after(|fx, _| touch_new(&fx.base_file("added.yml"))));
}

#[test]
fn file_deleted_is_stale() {
    assert!(!fresh_after(|fx, _| std::fs::remove_file(fx.base_file("sub/test.yml")).unwrap()));
}

#[test]
fn file_changed_is_stale() {
    assert!(!fresh_after(|fx, t| set_mtime(
        &fx.base_file("sub/test.yml"),
        t + Duration::from_secs(1)
    )));
}

#[test]
fn overridden_file_added_is_fresh() {
    assert!(fresh_after(|fx, _| touch_new(&fx.base_file("test.xml"))));
}

#[test]
fn overridden_file_deleted_is_fresh() {
    assert!(fresh_after(|fx, _| std::fs::remove_file(fx.base_file("test.xml")).unwrap()));
}

#[test]
fn overridden_file_changed_is_fresh() {
    assert!(fresh_after(|fx, t| set_mtime(
        &fx.base_file("test.xml"),
        t + Duration::from_secs(1)
    )));
}

#[test]
fn file_added_to_new_directory_is_stale() {
    assert!(!fresh_after(|fx, _| touch_new(&fx.base_file("added/added.yml"))));
}

#[test]
fn file_added_to_deeply_new_directory_is_stale() {
    assert!(!fresh_after(|fx, _| touch_new(&fx.base_file("sub/new/deeper/added.xml"))));
}

#[test]
fn file_added_to_directory_with_only_untracked_files_is_stale() {
    let fx = Fixture::new();
    write_old(&fx.base_file("docs/readme.txt"));
    let l = tracking_loader();
    let (resource, load_time) = register(&fx, &l);
    assert!(l.is_resource_fresh(GROUP, &fx.base, Some(&fx.app), &resource, load_time));

    touch_new(&fx.base_file("docs/extra.yml"));
    assert!(!l.is_resource_fresh(GROUP, &fx.base, Some(&fx.app), &resource, load_time));
}

#[test]
fn directory_created_is_fresh() {
    assert!(fresh_after(|fx, _| std::fs::create_dir(fx.base_file("added")).unwrap()));
}

#[test]
fn new_directory_with_untracked_file_is_fresh() {
    assert!(fresh_after(|fx, _| touch_new(&fx.base_file("added/notes.txt"))));
}

#[test]
fn directory_deleted_is_stale() {
    assert!(!fresh_after(|fx, _| std::fs::remove_dir_all(fx.base_file("sub")).unwrap()));
}

#[test]
fn untracked_file_added_is_fresh() {
    assert!(fresh_after(|fx, _| touch_new(&fx.base_file("added.txt"))));
}

#[test]
fn untracked_file_deleted_is_fresh() {
    assert!(fresh_after(|fx, _| std::fs::remove_file(fx.base_file("sub/test.txt")).unwrap()));
}

#[test]
fn untracked_file_changed_is_fresh() {
    assert!(fresh_after(|fx, t| set_mtime(
        &fx.base_file("test.txt"),
        t + Duration::from_secs(1)
    )));
}

// -- Freshness: override root --

#[test]
fn app_file_added_is_stale() {
    assert!(!fresh_after(|fx, _| touch_new(&fx.app_file("added.xml"))));
}

#[test]
fn app_file_deleted_is_stale() {
    assert!(!fresh_after(|fx, _| std::fs::remove_file(fx.app_file("test.xml")).unwrap()));
}

#[test]
fn app_file_changed_is_stale() {
    assert!(!fresh_after(|fx, t| set_mtime(
        &fx.app_file("test.xml"),
        t + Duration::from_secs(1)
    )));
}

#[test]
fn app_file_shadowing_tracked_base_file_is_stale() {
    assert!(!fresh_after(|fx, _| touch_new(&fx.app_file("sub/test.yml"))));
}

#[test]
fn untracked_app_file_added_is_fresh() {
    assert!(fresh_after(|fx, _| touch_new(&fx.app_file("added.txt"))));
}

#[test]
fn untracked_app_file_deleted_is_fresh() {
    assert!(fresh_after(|fx, _| std::fs::remove_file(fx.app_file("sub/test.txt")).unwrap()));
}

#[test]
fn untracked_app_file_changed_is_fresh() {
    assert!(fresh_after(|fx, t| set_mtime(
        &fx.app_file("sub/test.txt"),
        t + Duration::from_secs(1)
    )));
}

// -- Freshness: depth bound and empty scopes --

#[test]
fn additions_beyond_depth_bound_are_ignored() {
    let fx = Fixture::new();
    let l = loader(&["*.yml", "*.xml"], 2, true);
    let (resource, load_time) = register(&fx, &l);
    assert!(l.is_resource_fresh(GROUP, &fx.base, Some(&fx.app), &resource, load_time));

    touch_new(&fx.base_file("sub/sub1/added.yml"));
    touch_new(&fx.base_file("sub/brand_new/added.yml"));
    assert!(l.is_resource_fresh(GROUP, &fx.base, Some(&fx.app), &resource, load_time));

    touch_new(&fx.base_file("sub/added.yml"));
    assert!(!l.is_resource_fresh(GROUP, &fx.base, Some(&fx.app), &resource, load_time));
}

#[test]
fn empty_scope_stays_fresh_until_a_match_appears() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("bundle");
    std::fs::create_dir_all(&base).unwrap();
    let l = tracking_loader();

    let mut resource = CumulativeResource::new("test_group");
    l.register_found_resource(GROUP, &base, None, &mut resource);
    let now = SystemTime::now();
    assert!(l.is_resource_fresh(GROUP, &base, None, &resource, now));

    std::fs::create_dir_all(base.join(RELATIVE)).unwrap();
    touch_new(&base.join(RELATIVE).join("ignored.txt"));
    assert!(l.is_resource_fresh(GROUP, &base, None, &resource, now));

    touch_new(&base.join(RELATIVE).join("nested/config.yml"));
    assert!(!l.is_resource_fresh(GROUP, &base, None, &resource, now));
}

#[test]
fn cumulative_resource_checks_every_root() {
    let fx = Fixture::new();
    let l = tracking_loader();
    let root = ResourceRoot::new(GROUP, &fx.base).with_override(&fx.app);

    let mut resource = CumulativeResource::new("test_group");
    resource.add_root(root);
    resource.add_loader(l.clone());
    l.register_found_resource(GROUP, &fx.base, Some(&fx.app), &mut resource);
    let (_, load_time) = register(&fx, &l);

    let persisted: Resource = serde_json::from_str(
        &serde_json::to_string(&Resource::from(resource)).unwrap(),
    )
    .unwrap();
    assert!(persisted.is_cache_fresh(load_time));

    touch_new(&fx.app_file("sub/new.yml"));
    assert!(!persisted.is_cache_fresh(load_time));
}

#[test]
fn flat_order_compares_full_path_strings() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("bundle");
    let scope = base.join(RELATIVE);
    touch_new(&scope.join("sub.yml"));
    touch_new(&scope.join("sub/a.yml"));
    touch_new(&scope.join("sub-b.yml"));

    let info = tracking_loader().load(GROUP, &base, None).unwrap();
    assert_eq!(
        flat(&info.data),
        vec![
            scope.join("sub-b.yml"),
            scope.join("sub.yml"),
            scope.join("sub/a.yml"),
        ]
    );
}

/// Sets `mode` on `dir` and reports whether listing it is now refused.
/// Permission bits do not bind a privileged user, so callers skip their
/// assertions when this returns `false`.
#[cfg(unix)]
fn restrict(dir: &Path, mode: u32) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(dir, std::fs::Permissions::from_mode(mode)).unwrap();
    std::fs::read_dir(dir).is_err()
}

#[cfg(unix)]
fn unrestrict(dir: &Path) {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(unix)]
#[test]
fn unreadable_tracked_directory_is_stale() {
    let fx = Fixture::new();
    let l = tracking_loader();
    let (resource, load_time) = register(&fx, &l);
    assert!(l.is_resource_fresh(GROUP, &fx.base, Some(&fx.app), &resource, load_time));

    // Files stay reachable, only the listing is refused.
    let sub = fx.base_file("sub");
    let denied = restrict(&sub, 0o300);
    let fresh = l.is_resource_fresh(GROUP, &fx.base, Some(&fx.app), &resource, load_time);
    unrestrict(&sub);
    if denied {
        assert!(!fresh);
    }
}

#[cfg(unix)]
#[test]
fn locked_tracked_directory_is_stale() {
    let fx = Fixture::new();
    let l = tracking_loader();
    let (resource, load_time) = register(&fx, &l);

    let sub1 = fx.app_file("sub/sub1");
    let denied = restrict(&sub1, 0o000);
    let fresh = l.is_resource_fresh(GROUP, &fx.base, Some(&fx.app), &resource, load_time);
    unrestrict(&sub1);
    if denied {
        assert!(!fresh);
    }
}

#[cfg(unix)]
#[test]
fn unreadable_untracked_directory_is_skipped() {
    let fx = Fixture::new();
    let locked = fx.base_file("locked");
    write_old(&locked.join("hidden.yml"));
    let l = tracking_loader();

    let denied = restrict(&locked, 0o000);
    let info = l.load(GROUP, &fx.base, Some(&fx.app));
    let (resource, load_time) = register(&fx, &l);
    let fresh = l.is_resource_fresh(GROUP, &fx.base, Some(&fx.app), &resource, load_time);
    unrestrict(&locked);
    if !denied {
        return;
    }

    let files = flat(&info.expect("readable part of the scope is still loaded").data);
    assert_eq!(
        files,
        sorted(vec![
            fx.app_file("sub/sub1/test.xml"),
            fx.base_file("sub/test.yml"),
            fx.app_file("test.xml"),
        ])
    );
    assert!(!resource.is_found(GROUP, &locked.join("hidden.yml")));
    assert!(fresh);
}
