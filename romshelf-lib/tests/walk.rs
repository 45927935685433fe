use std::fs;
use std::path::Path;

use romshelf_lib::{WalkError, extension_set, walk_roms};

fn touch(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn names(outcome: &romshelf_lib::WalkOutcome) -> Vec<String> {
    outcome
        .files
        .iter()
        .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn recursive_walk_finds_nested_files_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("b.nes"), b"bb");
    touch(&dir.path().join("a.SFC"), b"a");
    touch(&dir.path().join("sub/c.gba"), b"ccc");
    touch(&dir.path().join("notes.txt"), b"skip me");

    let exts = extension_set(&["nes", "sfc", "gba"]);
    let outcome = walk_roms(dir.path(), true, &exts).unwrap();

    assert_eq!(names(&outcome), vec!["a.SFC", "b.nes", "c.gba"]);
    assert_eq!(outcome.files[2].size, 3);
    assert!(outcome.errors.is_empty());
}

#[test]
fn non_recursive_walk_ignores_subdirectories() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("top.nes"), b"x");
    touch(&dir.path().join("sub/deep.nes"), b"y");

    let outcome = walk_roms(dir.path(), false, &extension_set(&["nes"])).unwrap();
    assert_eq!(names(&outcome), vec!["top.nes"]);
}

#[test]
fn missing_root_is_hard_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = walk_roms(&dir.path().join("nope"), true, &extension_set(&["nes"]));
    assert!(matches!(result, Err(WalkError::PathNotFound(_))));
}

#[test]
fn file_root_is_hard_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("game.nes");
    touch(&file, b"x");
    let result = walk_roms(&file, true, &extension_set(&["nes"]));
    assert!(matches!(result, Err(WalkError::NotADirectory(_))));
}

#[cfg(unix)]
#[test]
fn dangling_symlink_is_reported_and_walk_continues() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("good.nes"), b"ok");
    std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("broken.nes"))
        .unwrap();

    let outcome = walk_roms(dir.path(), true, &extension_set(&["nes"])).unwrap();
    assert_eq!(names(&outcome), vec!["good.nes"]);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].path, dir.path().join("broken.nes"));
    assert!(outcome.errors[0].to_string().contains("broken.nes"));
}

#[cfg(unix)]
#[test]
fn symlinked_directories_are_not_followed() {
    let dir = tempfile::tempdir().unwrap();
    let outside = tempfile::tempdir().unwrap();
    touch(&outside.path().join("elsewhere.nes"), b"x");
    std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

    let outcome = walk_roms(dir.path(), true, &extension_set(&["nes"])).unwrap();
    assert!(outcome.files.is_empty());
    assert!(outcome.errors.is_empty());
}
