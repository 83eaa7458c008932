//! Local Filesystem Provider Tests
//!
//! Directory navigation, removal, resolution and listing against a real
//! temporary directory, driven only through the handle contracts.

use std::collections::HashSet;
use std::fs;

use edgedrive::storages::{
    DirectoryHandle, File, FileHandle, GetHandleOptions, Handle, HandleKind, LocalDirectoryHandle,
    LocalFileHandle, RemoveOptions, StorageError,
};
use futures_util::{StreamExt, TryStreamExt};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn setup() -> (TempDir, LocalDirectoryHandle) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let root = LocalDirectoryHandle::new(temp.path());
    (temp, root)
}

fn populated() -> (TempDir, LocalDirectoryHandle) {
    let (temp, root) = setup();
    fs::write(temp.path().join("file1.txt"), "content").unwrap();
    fs::write(temp.path().join("file2.txt"), "content").unwrap();
    fs::create_dir(temp.path().join("dir1")).unwrap();
    (temp, root)
}

// =============================================================================
// getDirectoryHandle
// =============================================================================

#[tokio::test]
async fn test_get_directory_handle_creates_when_asked() {
    let (temp, root) = setup();

    let dir = root
        .get_directory_handle("newdir", GetHandleOptions::create())
        .await
        .unwrap();

    assert_eq!(dir.kind(), HandleKind::Directory);
    assert_eq!(dir.name(), "newdir");
    assert!(temp.path().join("newdir").is_dir());
}

#[tokio::test]
async fn test_get_directory_handle_is_idempotent() {
    let (temp, root) = setup();

    let first = root
        .get_directory_handle("photos", GetHandleOptions::create())
        .await
        .unwrap();
    fs::write(temp.path().join("photos/cat.jpg"), "meow").unwrap();

    let second = root
        .get_directory_handle("photos", GetHandleOptions::create())
        .await
        .unwrap();

    assert!(first.is_same_entry(second.as_handle()));
    assert_eq!(
        fs::read_to_string(temp.path().join("photos/cat.jpg")).unwrap(),
        "meow"
    );
}

#[tokio::test]
async fn test_get_directory_handle_missing() {
    let (_temp, root) = setup();
    let result = root
        .get_directory_handle("nonexistent", GetHandleOptions::default())
        .await;
    assert!(matches!(result, Err(StorageError::NotFound(_))));
}

#[tokio::test]
async fn test_get_directory_handle_on_file_is_type_mismatch() {
    let (temp, root) = setup();
    fs::write(temp.path().join("file.txt"), "content").unwrap();

    for options in [GetHandleOptions::default(), GetHandleOptions::create()] {
        let result = root.get_directory_handle("file.txt", options).await;
        assert!(matches!(result, Err(StorageError::TypeMismatch(_))));
    }
    assert!(temp.path().join("file.txt").is_file());
}

#[tokio::test]
async fn test_handle_over_regular_file_is_type_mismatch() {
    let (temp, _root) = setup();
    let path = temp.path().join("plain.txt");
    fs::write(&path, "content").unwrap();
    let bogus = LocalDirectoryHandle::new(&path);

    let result = bogus
        .get_file_handle("child", GetHandleOptions::default())
        .await;
    assert!(matches!(result, Err(StorageError::TypeMismatch(_))));

    let result = bogus
        .get_directory_handle("child", GetHandleOptions::create())
        .await;
    assert!(matches!(result, Err(StorageError::TypeMismatch(_))));

    let result = bogus.remove_entry("child", RemoveOptions::default()).await;
    assert!(matches!(result, Err(StorageError::TypeMismatch(_))));

    let mut entries = bogus.entries();
    assert!(matches!(
        entries.next().await,
        Some(Err(StorageError::TypeMismatch(_)))
    ));
    assert!(path.is_file());
}

// =============================================================================
// getFileHandle
// =============================================================================

#[tokio::test]
async fn test_get_file_handle_existing() {
    let (temp, root) = setup();
    fs::write(temp.path().join("test.txt"), "content").unwrap();

    let handle = root
        .get_file_handle("test.txt", GetHandleOptions::default())
        .await
        .unwrap();
    assert_eq!(handle.kind(), HandleKind::File);

    let file = handle.get_file().await.unwrap();
    assert_eq!(file.text().await.unwrap(), "content");
}

#[tokio::test]
async fn test_get_file_handle_missing() {
    let (_temp, root) = setup();
    let result = root
        .get_file_handle("nonexistent.txt", GetHandleOptions::default())
        .await;
    assert!(matches!(result, Err(StorageError::NotFound(_))));
}

#[tokio::test]
async fn test_get_file_handle_create_does_not_materialize() {
    let (temp, root) = setup();

    let handle = root
        .get_file_handle("later.txt", GetHandleOptions::create())
        .await
        .unwrap();

    assert_eq!(handle.name(), "later.txt");
    assert!(!temp.path().join("later.txt").exists());
    assert!(matches!(
        handle.get_file().await,
        Err(StorageError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_get_file_handle_on_directory_is_type_mismatch() {
    let (temp, root) = setup();
    fs::create_dir(temp.path().join("dir")).unwrap();

    for options in [GetHandleOptions::default(), GetHandleOptions::create()] {
        let result = root.get_file_handle("dir", options).await;
        assert!(matches!(result, Err(StorageError::TypeMismatch(_))));
    }
}

// =============================================================================
// removeEntry
// =============================================================================

#[tokio::test]
async fn test_remove_file() {
    let (temp, root) = setup();
    fs::write(temp.path().join("to-remove.txt"), "content").unwrap();

    root.remove_entry("to-remove.txt", RemoveOptions::default())
        .await
        .unwrap();
    assert!(!temp.path().join("to-remove.txt").exists());
}

#[tokio::test]
async fn test_remove_directory_recursively() {
    let (temp, root) = setup();
    fs::create_dir_all(temp.path().join("dir-to-remove/nested")).unwrap();
    fs::write(temp.path().join("dir-to-remove/file.txt"), "content").unwrap();
    fs::write(temp.path().join("dir-to-remove/nested/deep.txt"), "content").unwrap();

    root.remove_entry("dir-to-remove", RemoveOptions::recursive())
        .await
        .unwrap();
    assert!(!temp.path().join("dir-to-remove").exists());
}

#[tokio::test]
async fn test_remove_empty_directory_without_recursive() {
    let (temp, root) = setup();
    fs::create_dir(temp.path().join("empty")).unwrap();

    root.remove_entry("empty", RemoveOptions::default())
        .await
        .unwrap();
    assert!(!temp.path().join("empty").exists());
}

#[tokio::test]
async fn test_remove_non_empty_directory_without_recursive_fails() {
    let (temp, root) = setup();
    fs::create_dir(temp.path().join("full")).unwrap();
    fs::write(temp.path().join("full/file.txt"), "content").unwrap();

    let result = root.remove_entry("full", RemoveOptions::default()).await;
    assert!(result.is_err());
    assert!(temp.path().join("full/file.txt").exists());
}

#[tokio::test]
async fn test_remove_missing_is_not_found() {
    let (_temp, root) = setup();
    for options in [RemoveOptions::default(), RemoveOptions::recursive()] {
        let result = root.remove_entry("nonexistent", options).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }
}

// =============================================================================
// resolve
// =============================================================================

#[tokio::test]
async fn test_resolve_descendant() {
    let (_temp, root) = setup();
    let subdir = root
        .get_directory_handle("subdir", GetHandleOptions::create())
        .await
        .unwrap();
    let file = subdir
        .get_file_handle("notes.md", GetHandleOptions::create())
        .await
        .unwrap();

    assert_eq!(root.resolve(subdir.as_handle()), Some(vec!["subdir".to_string()]));
    assert_eq!(
        root.resolve(file.as_handle()),
        Some(vec!["subdir".to_string(), "notes.md".to_string()])
    );
}

#[tokio::test]
async fn test_resolve_non_descendant() {
    let (temp, root) = setup();
    let other = LocalDirectoryHandle::new("/other/path");
    assert_eq!(root.resolve(&other), None);

    let b = root
        .get_directory_handle("b", GetHandleOptions::create())
        .await
        .unwrap();
    let bc = root
        .get_directory_handle("bc", GetHandleOptions::create())
        .await
        .unwrap();
    assert_eq!(b.resolve(bc.as_handle()), None);

    let overlapping = LocalFileHandle::new(temp.path().join("bc").join("x.txt"));
    assert_eq!(b.resolve(&overlapping), None);
}

// =============================================================================
// entries / keys / values
// =============================================================================

#[tokio::test]
async fn test_entries() {
    let (_temp, root) = populated();

    let entries: Vec<_> = root.entries().try_collect().await.unwrap();
    assert_eq!(entries.len(), 3);

    let names: HashSet<String> = entries.iter().map(|(name, _)| name.clone()).collect();
    let expected: HashSet<String> = ["file1.txt", "file2.txt", "dir1"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(names, expected);

    for (name, entry) in &entries {
        assert_eq!(&entry.name(), name);
        let expected_kind = if name == "dir1" {
            HandleKind::Directory
        } else {
            HandleKind::File
        };
        assert_eq!(entry.kind(), expected_kind);
    }
}

#[tokio::test]
async fn test_keys() {
    let (_temp, root) = populated();

    let keys: Vec<String> = root.keys().try_collect().await.unwrap();
    assert_eq!(keys.len(), 3);
    assert!(keys.contains(&"file1.txt".to_string()));
    assert!(keys.contains(&"file2.txt".to_string()));
    assert!(keys.contains(&"dir1".to_string()));
}

#[tokio::test]
async fn test_values() {
    let (_temp, root) = populated();

    let values: Vec<_> = root.values().try_collect().await.unwrap();
    assert_eq!(values.len(), 3);
    assert_eq!(
        values.iter().filter(|v| v.kind() == HandleKind::File).count(),
        2
    );
    assert_eq!(
        values
            .iter()
            .filter(|v| v.kind() == HandleKind::Directory)
            .count(),
        1
    );
}

#[tokio::test]
async fn test_listing_is_fresh_per_call() {
    let (temp, root) = populated();

    let before: Vec<String> = root.keys().try_collect().await.unwrap();
    fs::write(temp.path().join("file3.txt"), "content").unwrap();
    let after: Vec<String> = root.keys().try_collect().await.unwrap();

    assert_eq!(before.len(), 3);
    assert_eq!(after.len(), 4);
}

#[tokio::test]
async fn test_listing_only_direct_children() {
    let (temp, root) = populated();
    fs::write(temp.path().join("dir1/inner.txt"), "content").unwrap();

    let keys: Vec<String> = root.keys().try_collect().await.unwrap();
    assert_eq!(keys.len(), 3);
    assert!(!keys.contains(&"inner.txt".to_string()));
}

// =============================================================================
// Streams
// =============================================================================

#[tokio::test]
async fn test_dropped_stream_releases_file() {
    let (temp, root) = setup();
    let content = vec![b'x'; 256 * 1024];
    fs::write(temp.path().join("large.bin"), &content).unwrap();

    let handle = root
        .get_file_handle("large.bin", GetHandleOptions::default())
        .await
        .unwrap();
    let file = handle.get_file().await.unwrap();

    let mut stream = file.stream().await.unwrap();
    let first = stream.try_next().await.unwrap().unwrap();
    assert!(!first.is_empty());
    assert!(first.len() < content.len());
    drop(stream);

    root.remove_entry("large.bin", RemoveOptions::default())
        .await
        .unwrap();
    assert!(!temp.path().join("large.bin").exists());

    fs::write(temp.path().join("large.bin"), "fresh").unwrap();
    let reopened = root
        .get_file_handle("large.bin", GetHandleOptions::default())
        .await
        .unwrap()
        .get_file()
        .await
        .unwrap();
    assert_eq!(reopened.text().await.unwrap(), "fresh");
}

// =============================================================================
// End to end
// =============================================================================

#[tokio::test]
async fn test_navigate_and_read_ranges() {
    let (temp, root) = setup();
    fs::create_dir_all(temp.path().join("docs/2024")).unwrap();
    fs::write(temp.path().join("docs/2024/hello.txt"), "Hello World").unwrap();

    let docs = root
        .get_directory_handle("docs", GetHandleOptions::default())
        .await
        .unwrap();
    let year = docs
        .get_directory_handle("2024", GetHandleOptions::default())
        .await
        .unwrap();
    let handle = year
        .get_file_handle("hello.txt", GetHandleOptions::default())
        .await
        .unwrap();
    let file = handle.get_file().await.unwrap();

    assert_eq!(file.size().await.unwrap(), 11);
    assert_eq!(file.content_type().await.unwrap(), "text/plain");

    let content = b"Hello World";
    for start in 0..=11i64 {
        for end in start..=11i64 {
            let sliced = file.slice(start, end).unwrap();
            assert_eq!(sliced.size().await.unwrap(), (end - start) as u64);
            assert_eq!(
                &sliced.bytes().await.unwrap()[..],
                &content[start as usize..end as usize]
            );
        }
    }

    let composed = file.slice(1, 9).unwrap().slice(2, 5).unwrap();
    assert_eq!(composed.text().await.unwrap(), "lo ");

    assert!(matches!(
        file.slice(0, -1),
        Err(StorageError::NotImplemented(_))
    ));
}
