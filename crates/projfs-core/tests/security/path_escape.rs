//! Path escape tests.
//!
//! Every operation that takes a caller path must either stay inside the
//! root or fail with a path escape, whatever mix of `..`, absolute
//! prefixes and symlinks the path contains.

use projfs_core::{
    FsError, ListOptions, ProjectRoot, ReadOptions, WriteOptions, list, read, write,
};
use std::fs;
use tempfile::TempDir;

/// Creates `<tmp>/proj` with a small tree, plus a sibling `<tmp>/proj-evil`.
fn setup() -> (TempDir, ProjectRoot) {
    let temp = TempDir::new().unwrap();
    let proj = temp.path().join("proj");
    fs::create_dir_all(proj.join("src/deep/er")).unwrap();
    fs::write(proj.join("src/a.ts"), "const x = 1;\n").unwrap();
    fs::create_dir_all(temp.path().join("proj-evil")).unwrap();
    fs::write(temp.path().join("proj-evil/secret.txt"), "s3cret").unwrap();
    let root = ProjectRoot::new(&proj).unwrap();
    (temp, root)
}

/// Test that every accepted resolution lands inside the root.
#[test]
fn test_resolution_never_leaves_root() {
    let (_temp, root) = setup();

    let inputs = [
        ".",
        "",
        "src",
        "src/..",
        "src/deep/../../src/a.ts",
        "src/deep/er/../../../..",
        "..",
        "../..",
        "../../etc/passwd",
        "./../proj",
        "../proj/src/a.ts",
        "../proj-evil/secret.txt",
        "src/../../proj-evil",
        "/",
        "/etc/passwd",
        "missing/../../..",
        "a/b/c/../../../../x",
    ];

    for input in inputs {
        match root.resolve(input) {
            Ok(resolved) => assert!(
                resolved.as_path().starts_with(root.path()),
                "'{input}' resolved outside the root: {}",
                resolved.as_path().display()
            ),
            Err(e) => assert!(e.is_path_escape(), "'{input}' failed with {e:?}"),
        }
    }
}

/// Test the canonical traversal example.
#[test]
fn test_etc_passwd_rejected() {
    let (_temp, root) = setup();
    let err = root.resolve("../../etc/passwd").unwrap_err();

    match err {
        FsError::PathEscape { path, root: reported } => {
            assert_eq!(path, "../../etc/passwd");
            assert_eq!(reported, root.path());
        }
        other => panic!("expected PathEscape, got {other:?}"),
    }
}

/// Test that a sibling sharing the root's name as a string prefix is rejected.
#[test]
fn test_string_prefix_sibling_rejected() {
    let (_temp, root) = setup();
    let sibling = root.path().with_file_name("proj-evil");

    let err = root.resolve(sibling.to_str().unwrap()).unwrap_err();
    assert!(err.is_path_escape());

    let err = read(&root, "../proj-evil/secret.txt", &ReadOptions::default()).unwrap_err();
    assert!(err.is_path_escape());
}

/// Test that going up and back down into the root is accepted.
#[test]
fn test_reentering_root_accepted() {
    let (_temp, root) = setup();
    let resolved = root.resolve("../proj/src/a.ts").unwrap();
    assert_eq!(resolved.relative(), "src/a.ts");
}

/// Test that every operation rejects escapes before touching the filesystem.
#[test]
fn test_all_operations_reject_escape() {
    let (temp, root) = setup();

    assert!(
        list(&root, "..", &ListOptions::default())
            .unwrap_err()
            .is_path_escape()
    );
    assert!(
        read(&root, "../proj-evil/secret.txt", &ReadOptions::default())
            .unwrap_err()
            .is_path_escape()
    );

    let options = WriteOptions::new().with_create_dirs(true);
    assert!(
        write(&root, "../dropped/file.txt", "x", &options)
            .unwrap_err()
            .is_path_escape()
    );
    assert!(!temp.path().join("dropped").exists());
}

#[cfg(unix)]
mod symlinks {
    use super::*;
    use std::os::unix::fs::symlink;

    /// Test that a symlinked directory pointing outside cannot be read through.
    #[test]
    fn test_symlink_dir_out_of_root() {
        let (temp, root) = setup();
        symlink(temp.path().join("proj-evil"), root.path().join("escape")).unwrap();

        let err = read(&root, "escape/secret.txt", &ReadOptions::default()).unwrap_err();
        assert!(err.is_path_escape());

        let err = list(&root, "escape", &ListOptions::default()).unwrap_err();
        assert!(err.is_path_escape());
    }

    /// Test that a symlinked file pointing outside cannot be read or overwritten.
    #[test]
    fn test_symlink_file_out_of_root() {
        let (temp, root) = setup();
        symlink(
            temp.path().join("proj-evil/secret.txt"),
            root.path().join("innocent.txt"),
        )
        .unwrap();

        let err = read(&root, "innocent.txt", &ReadOptions::default()).unwrap_err();
        assert!(err.is_path_escape());

        let err = write(&root, "innocent.txt", "pwned", &WriteOptions::new()).unwrap_err();
        assert!(err.is_path_escape());
        assert_eq!(
            fs::read_to_string(temp.path().join("proj-evil/secret.txt")).unwrap(),
            "s3cret"
        );
    }

    /// Test that writing a new file beneath an escaping symlink is rejected.
    #[test]
    fn test_write_through_symlink_dir_rejected() {
        let (temp, root) = setup();
        symlink(temp.path().join("proj-evil"), root.path().join("escape")).unwrap();

        let options = WriteOptions::new().with_create_dirs(true);
        let err = write(&root, "escape/new/planted.txt", "x", &options).unwrap_err();
        assert!(err.is_path_escape());
        assert!(!temp.path().join("proj-evil/new").exists());
    }

    /// Test that a dangling file link pointing outside cannot be written through.
    #[test]
    fn test_write_through_dangling_file_link_rejected() {
        let (temp, root) = setup();
        symlink("../proj-evil/planted.txt", root.path().join("evil.txt")).unwrap();

        for create_dirs in [false, true] {
            let options = WriteOptions::new().with_create_dirs(create_dirs);
            let err = write(&root, "evil.txt", "pwned", &options).unwrap_err();
            assert!(err.is_path_escape(), "create_dirs={create_dirs}: {err:?}");
        }
        assert!(!temp.path().join("proj-evil/planted.txt").exists());
    }

    /// Test that a dangling link into a missing outside tree creates nothing.
    #[test]
    fn test_write_through_dangling_link_to_missing_tree_rejected() {
        let (temp, root) = setup();
        symlink(
            temp.path().join("outside/deeper/planted.txt"),
            root.path().join("evil.txt"),
        )
        .unwrap();

        let options = WriteOptions::new().with_create_dirs(true);
        let err = write(&root, "evil.txt", "pwned", &options).unwrap_err();
        assert!(err.is_path_escape());
        assert!(!temp.path().join("outside").exists());
    }

    /// Test that a dangling directory link cannot be used as a parent.
    #[test]
    fn test_write_through_dangling_dir_link_rejected() {
        let (temp, root) = setup();
        symlink(temp.path().join("proj-evil/missing-dir"), root.path().join("gone")).unwrap();

        for create_dirs in [false, true] {
            let options = WriteOptions::new().with_create_dirs(create_dirs);
            let err = write(&root, "gone/file.txt", "pwned", &options).unwrap_err();
            assert!(err.is_path_escape(), "create_dirs={create_dirs}: {err:?}");
        }
        assert!(!temp.path().join("proj-evil/missing-dir").exists());
    }

    /// Test that a dangling link pointing back inside the root writes its target.
    #[test]
    fn test_write_through_dangling_link_inside_root() {
        let (_temp, root) = setup();
        symlink("src/later.ts", root.path().join("soon.ts")).unwrap();

        let outcome = write(&root, "soon.ts", "export {}", &WriteOptions::new()).unwrap();
        assert_eq!(outcome.path, "src/later.ts");
        assert_eq!(
            fs::read_to_string(root.path().join("src/later.ts")).unwrap(),
            "export {}"
        );
    }
}
