use coverage_aggregate::discovery::{find_files, FileFilter};
use coverage_aggregate::utils::config::{resolve_output_directory, AggregateConfig};
use coverage_aggregate::utils::error::{ConfigError, DiscoveryError};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"").unwrap();
}

fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
    let root = fs::canonicalize(root).unwrap();
    files
        .iter()
        .map(|f| {
            fs::canonicalize(f)
                .unwrap()
                .strip_prefix(&root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn test_default_pattern_only_top_level_target() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "target/jacoco.exec");
    touch(dir.path(), "target/jacoco-it.exec");
    touch(dir.path(), "target/nested/deep.exec");
    touch(dir.path(), "other/x.exec");

    let files = find_files(dir.path(), &[], &[]).unwrap();

    assert_eq!(
        names(dir.path(), &files),
        vec!["target/jacoco-it.exec", "target/jacoco.exec"]
    );
}

#[test]
fn test_results_are_subset_of_includes_minus_excludes() {
    let dir = tempfile::tempdir().unwrap();
    for relative in [
        "target/a.exec",
        "target/b.exec",
        "build/c.exec",
        "build/skip/d.exec",
        "build/readme.txt",
    ] {
        touch(dir.path(), relative);
    }

    let includes = strings(&["**/*.exec"]);
    let excludes = strings(&["build/skip/**"]);
    let filter = FileFilter::for_data_files(&includes, &excludes).unwrap();
    let files = filter.find_files(dir.path()).unwrap();
    let found = names(dir.path(), &files);

    assert_eq!(found, vec!["build/c.exec", "target/a.exec", "target/b.exec"]);
    for relative in &found {
        assert!(filter.matches(relative));
    }
}

#[test]
fn test_file_name_pattern_matches_any_depth() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "a/b/c/jacoco.exec");
    touch(dir.path(), "jacoco.exec");

    let files = find_files(dir.path(), &strings(&["jacoco.exec"]), &[]).unwrap();
    assert_eq!(names(dir.path(), &files), vec!["a/b/c/jacoco.exec", "jacoco.exec"]);
}

#[test]
fn test_missing_base_dir_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let files = find_files(&dir.path().join("nope"), &[], &[]).unwrap();
    assert!(files.is_empty());
}

#[test]
fn test_malformed_pattern_fails_before_io() {
    let result = find_files(Path::new("/does/not/matter"), &strings(&["target/[.exec"]), &[]);
    assert!(matches!(
        result,
        Err(DiscoveryError::Pattern(ConfigError::InvalidPattern { .. }))
    ));
}

#[test]
fn test_empty_includes_same_as_default_pattern() {
    let dir = tempfile::tempdir().unwrap();
    for relative in ["target/jacoco.exec", "target/it/nested.exec", "jacoco.exec", "target/x.txt"] {
        touch(dir.path(), relative);
    }

    let implicit = find_files(dir.path(), &[], &[]).unwrap();
    let explicit = find_files(dir.path(), &strings(&["target/*.exec"]), &[]).unwrap();

    assert_eq!(implicit, explicit);
    assert_eq!(names(dir.path(), &implicit), vec!["target/jacoco.exec"]);
}

const TREE_DIRS: &[&str] = &["", "target", "target/sub", "build", "build/skip"];

/// Relative paths of a generated tree, each `dir/name.ext`
fn tree() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::vec(
        (
            prop::sample::select(TREE_DIRS.to_vec()),
            "[a-c]{1,3}",
            prop::sample::select(vec!["exec", "txt", "class"]),
        ),
        0..12,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .map(|(dir, name, ext)| match dir {
                "" => format!("{}.{}", name, ext),
                _ => format!("{}/{}.{}", dir, name, ext),
            })
            .collect()
    })
}

fn patterns() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::sample::select(vec!["target/*.exec", "**/*.exec", "build/**", "*.txt", "target/sub/?.exec"]),
        0..3,
    )
    .prop_map(|values| strings(&values))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Leaving the includes empty behaves exactly like `target/*.exec`
    #[test]
    fn prop_default_include_equivalent(files in tree(), excludes in patterns()) {
        let dir = tempfile::tempdir().unwrap();
        for relative in &files {
            touch(dir.path(), relative);
        }

        let implicit = find_files(dir.path(), &[], &excludes).unwrap();
        let explicit = find_files(dir.path(), &strings(&["target/*.exec"]), &excludes).unwrap();

        prop_assert_eq!(implicit, explicit);
    }

    /// The result is exactly the generated files the filter accepts, sorted
    #[test]
    fn prop_results_match_includes_minus_excludes(
        files in tree(),
        includes in patterns(),
        excludes in patterns()
    ) {
        let dir = tempfile::tempdir().unwrap();
        for relative in &files {
            touch(dir.path(), relative);
        }

        let filter = FileFilter::for_data_files(&includes, &excludes).unwrap();
        let found = names(dir.path(), &filter.find_files(dir.path()).unwrap());
        let expected: Vec<String> = files.iter().filter(|f| filter.matches(f)).cloned().collect();

        prop_assert_eq!(&found, &expected);
        let mut sorted = found.clone();
        sorted.sort();
        prop_assert_eq!(found, sorted);
    }

    /// With the default include only `.exec` files directly in `target/` are found
    #[test]
    fn prop_default_include_is_top_level_target_exec(files in tree()) {
        let dir = tempfile::tempdir().unwrap();
        for relative in &files {
            touch(dir.path(), relative);
        }

        let found = names(dir.path(), &find_files(dir.path(), &[], &[]).unwrap());
        let expected: Vec<String> = files
            .iter()
            .filter(|f| {
                f.strip_prefix("target/")
                    .is_some_and(|rest| !rest.contains('/') && rest.ends_with(".exec"))
            })
            .cloned()
            .collect();

        prop_assert_eq!(found, expected);
    }
}

#[test]
fn test_config_validation_rejects_bad_class_pattern() {
    let config = AggregateConfig {
        excludes: strings(&["com/**/[broken"]),
        ..AggregateConfig::default()
    };
    assert!(config.validate(Path::new("/proj"), "proj").is_err());
}

#[test]
fn test_output_directory_contract() {
    let site = Path::new("/proj/target/site");

    assert_eq!(
        resolve_output_directory(site, None),
        PathBuf::from("/proj/target/site/jacoco-aggregate")
    );
    assert_eq!(
        resolve_output_directory(site, Some(Path::new("/out/custom"))),
        PathBuf::from("/out/custom/jacoco-aggregate")
    );
    assert_eq!(
        resolve_output_directory(site, Some(Path::new("/out/jacoco-aggregate"))),
        PathBuf::from("/out/jacoco-aggregate")
    );
}
