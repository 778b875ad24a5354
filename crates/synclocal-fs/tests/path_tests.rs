use pretty_assertions::assert_eq;
use synclocal_fs::NormalizedPath;

#[test]
fn test_normalize_forward_slashes() {
    let path = NormalizedPath::new("foo/bar/baz");
    assert_eq!(path.as_str(), "foo/bar/baz");
}

#[test]
fn test_normalize_backslashes_to_forward() {
    let path = NormalizedPath::new("foo\\bar\\baz");
    assert_eq!(path.as_str(), "foo/bar/baz");
}

#[test]
fn test_normalize_mixed_slashes() {
    let path = NormalizedPath::new("foo/bar\\baz");
    assert_eq!(path.as_str(), "foo/bar/baz");
}

#[test]
fn test_normalize_dot_components() {
    let path = NormalizedPath::new("./foo/./bar/../baz/");
    assert_eq!(path.as_str(), "foo/baz");
}

#[test]
fn test_join_paths() {
    let base = NormalizedPath::new("foo/bar");
    let joined = base.join("baz");
    assert_eq!(joined.as_str(), "foo/bar/baz");
}

#[test]
fn test_join_parent_segment() {
    let base = NormalizedPath::new("/srv/data");
    assert_eq!(base.join("../cache/x").as_str(), "/srv/cache/x");
}

#[test]
fn test_to_native_returns_pathbuf() {
    let path = NormalizedPath::new("foo/bar");
    let native = path.to_native();
    assert!(native.to_string_lossy().contains("bar"));
}

#[test]
fn test_parent() {
    let path = NormalizedPath::new("foo/bar/baz");
    let parent = path.parent().unwrap();
    assert_eq!(parent.as_str(), "foo/bar");
}

#[test]
fn test_parent_of_root_child() {
    let path = NormalizedPath::new("/dest-file");
    assert_eq!(path.parent().unwrap().as_str(), "/");
}

#[test]
fn test_file_name() {
    let path = NormalizedPath::new("foo/bar/baz.txt");
    assert_eq!(path.file_name(), Some("baz.txt"));
}

#[test]
fn test_absolute_is_rooted() {
    let path = NormalizedPath::absolute("relative/file").unwrap();
    assert!(path.is_absolute());
    assert!(!NormalizedPath::new("relative/file").is_absolute());
}

#[test]
fn test_absolute_of_absolute_is_unchanged() {
    let first = NormalizedPath::absolute("x/y").unwrap();
    let second = NormalizedPath::absolute(first.to_native()).unwrap();
    assert_eq!(first, second);
}
