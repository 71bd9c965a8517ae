use crate::*;
use libtest_mimic::Trial;
use stowage::error::ErrorKind;
use stowage::storage::{Backend, Client};

pub fn tests(tests: &mut Vec<Trial>) {
    tests.extend(async_trials!(
        test_mkdir_creates_directory,
        test_mkdir_existing_directory,
        test_mkdir_without_parent,
        test_mkdir_with_parents,
        test_object_store_mkdir_accepts_prefix_parent,
        test_directory_operations_unsupported_on_sync_service,
        test_rmdir_empty_directory,
        test_rmdir_non_empty_directory,
        test_rmdir_recursive,
        test_rmdir_missing_directory,
    ));
}

async fn test_mkdir_creates_directory(env: TestEnv) -> TestResult {
    let mut client = env.client();

    assert_eq!(client.mkdir("/projects", false).await?, "projects/");
    assert!(env.remote_root().join("projects").is_dir());
    assert_eq!(client.list("/", false).await?, "projects/");
    Ok(())
}

async fn test_mkdir_existing_directory(env: TestEnv) -> TestResult {
    env.operator.create_dir("docs/").await?;

    for backend in [Backend::Fs, Backend::S3] {
        let err = env
            .client_for(backend)
            .mkdir("docs", false)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists, "{backend:?}");
    }
    // File shares treat an existing directory as already done.
    env.client_for(Backend::AzureFile).mkdir("docs", false).await?;
    Ok(())
}

async fn test_mkdir_without_parent(env: TestEnv) -> TestResult {
    for backend in [Backend::Fs, Backend::S3, Backend::AzureFile] {
        let err = env
            .client_for(backend)
            .mkdir("a/b/c", false)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Remote resource 'a/b' not found", "{backend:?}");
    }
    assert!(!env.remote_root().join("a").exists());
    Ok(())
}

async fn test_mkdir_with_parents(env: TestEnv) -> TestResult {
    let mut client = env.client();

    client.mkdir("a/b/c", true).await?;
    assert_eq!(client.list("a", true).await?, "a\n└── b\n    └── c");
    Ok(())
}

async fn test_object_store_mkdir_accepts_prefix_parent(env: TestEnv) -> TestResult {
    // "photos/" exists only because a key lives under it.
    env.write_remote("photos/cat.jpg", "meow").await;
    let mut store = env.client_for(Backend::S3);

    store.mkdir("photos/2024", false).await?;
    assert!(env.remote_root().join("photos/2024").is_dir());
    Ok(())
}

async fn test_directory_operations_unsupported_on_sync_service(env: TestEnv) -> TestResult {
    let mut sync = env.client_for(Backend::Dropbox);

    let err = sync.mkdir("music", true).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);
    assert_eq!(err.to_string(), "'mkdir' is not supported by Dropbox");

    let err = sync.rmdir("music", true).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);
    Ok(())
}

async fn test_rmdir_empty_directory(env: TestEnv) -> TestResult {
    env.operator.create_dir("old/").await?;
    let mut client = env.client();
    assert_eq!(client.list("/", false).await?, "old/");

    assert_eq!(client.rmdir("old", false).await?, "old/");
    assert!(!env.remote_root().join("old").exists());
    assert_eq!(client.list("/", false).await?, "");
    Ok(())
}

async fn test_rmdir_non_empty_directory(env: TestEnv) -> TestResult {
    env.write_remote("full/file.txt", "data").await;

    for backend in [Backend::Fs, Backend::S3, Backend::AzureFile] {
        let err = env
            .client_for(backend)
            .rmdir("full", false)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DirectoryNotEmpty, "{backend:?}");
    }
    assert!(env.remote_exists("full/file.txt"));
    Ok(())
}

async fn test_rmdir_recursive(env: TestEnv) -> TestResult {
    env.write_remote("tree/a.txt", "a").await;
    env.write_remote("tree/deep/b.txt", "b").await;
    let mut client = env.client();

    client.rmdir("tree/", true).await?;
    assert!(!env.remote_exists("tree/a.txt"));
    assert!(!env.remote_exists("tree/deep/b.txt"));
    Ok(())
}

async fn test_rmdir_missing_directory(env: TestEnv) -> TestResult {
    let mut client = env.client();
    let err = client.rmdir("ghost", true).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    Ok(())
}
