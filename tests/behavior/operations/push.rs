use crate::*;
use libtest_mimic::Trial;
use stowage::error::ErrorKind;
use stowage::storage::constants::FILE_SHARE_MAX_RANGE_WRITE;
use stowage::storage::operations::Uploader;
use stowage::storage::operations::upload::OpenDalUploader;
use stowage::storage::{Backend, Client};

const MIB: usize = 1024 * 1024;

pub fn tests(tests: &mut Vec<Trial>) {
    tests.extend(async_trials!(
        test_push_file,
        test_push_five_mib_in_four_mib_ranges,
        test_push_existing_destination_is_rejected,
        test_push_checks_every_file_before_sending,
        test_push_directory_requires_recursive,
        test_push_recursive_skips_hidden_entries,
        test_push_missing_source,
        test_push_file_share_requires_parent_directory,
        test_push_sync_service_checks_tree,
    ));
}

async fn test_push_file(env: TestEnv) -> TestResult {
    let content = random_content(1..64 * 1024);
    let name = unique_name("csv");
    let source = env.write_local(&name, &content);
    let mut client = env.client();

    let remote = client
        .push(&source, &format!("/reports//{name}"), false)
        .await?;

    assert_eq!(remote, format!("reports/{name}"));
    assert_eq!(env.read_remote(&remote).await, content);
    Ok(())
}

async fn test_push_five_mib_in_four_mib_ranges(env: TestEnv) -> TestResult {
    let content = random_content(5 * MIB..5 * MIB + 1);
    let source = env.write_local("five.bin", &content);

    let uploader = OpenDalUploader::new(
        env.operator.clone(),
        Backend::AzureFile,
        FILE_SHARE_MAX_RANGE_WRITE,
    );
    let ranges = uploader.upload(&source, "five.bin").await?;

    let bounds: Vec<_> = ranges.iter().map(|r| (r.start, r.end)).collect();
    assert_eq!(bounds, vec![(0, 4_194_303), (4_194_304, 5_242_879)]);
    assert_eq!(env.read_remote("five.bin").await, content);

    // The same file through the file share adapter lands intact.
    let mut client = env.client_for(Backend::AzureFile);
    client.push(&source, "copy.bin", false).await?;
    assert_eq!(env.read_remote("copy.bin").await, content);
    Ok(())
}

async fn test_push_existing_destination_is_rejected(env: TestEnv) -> TestResult {
    env.write_remote("notes.txt", "remote").await;
    let source = env.write_local("notes.txt", "local");

    for backend in [Backend::Fs, Backend::S3, Backend::AzureFile, Backend::Dropbox] {
        let err = env
            .client_for(backend)
            .push(&source, "notes.txt", false)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists, "{backend:?}");
    }
    assert_eq!(env.read_remote("notes.txt").await, b"remote");
    Ok(())
}

async fn test_push_checks_every_file_before_sending(env: TestEnv) -> TestResult {
    env.write_remote("site/b.html", "old").await;
    env.write_local("site/a.html", "a");
    env.write_local("site/b.html", "b");
    let mut client = env.client();

    let err = client
        .push(&env.local_path("site"), "site", true)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Remote resource already exists at 'site/b.html'");
    assert!(!env.remote_exists("site/a.html"));
    assert_eq!(env.read_remote("site/b.html").await, b"old");
    Ok(())
}

async fn test_push_directory_requires_recursive(env: TestEnv) -> TestResult {
    env.write_local("photos/cat.jpg", "meow");
    let mut client = env.client();

    let err = client
        .push(&env.local_path("photos"), "photos", false)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RecursiveRequired);
    Ok(())
}

async fn test_push_recursive_skips_hidden_entries(env: TestEnv) -> TestResult {
    env.write_local("proj/src/main.rs", "fn main() {}");
    env.write_local("proj/.git/HEAD", "ref");
    env.write_local("proj/.env", "SECRET=1");
    std::fs::create_dir_all(env.local_path("proj/empty"))?;
    let mut client = env.client();

    let remote = client.push(&env.local_path("proj"), "backup/proj", true).await?;

    assert_eq!(remote, "backup/proj");
    assert_eq!(
        client.list("backup/proj", true).await?,
        "proj\n├── empty\n└── src\n    └── main.rs"
    );
    assert!(!env.remote_exists("backup/proj/.env"));
    Ok(())
}

async fn test_push_missing_source(env: TestEnv) -> TestResult {
    let mut client = env.client();
    let err = client
        .push(&env.local_path("ghost.txt"), "ghost.txt", false)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LocalNotFound);
    Ok(())
}

async fn test_push_file_share_requires_parent_directory(env: TestEnv) -> TestResult {
    let source = env.write_local("a.txt", "a");
    let mut share = env.client_for(Backend::AzureFile);

    let err = share.push(&source, "missing/dir/a.txt", false).await.unwrap_err();
    assert_eq!(err.to_string(), "Remote resource 'missing/dir' not found");

    // The local backend creates parents on write.
    env.client().push(&source, "missing/dir/a.txt", false).await?;
    assert!(env.remote_exists("missing/dir/a.txt"));
    Ok(())
}

async fn test_push_sync_service_checks_tree(env: TestEnv) -> TestResult {
    let source = env.write_local("song.mp3", random_content(10..100));
    let mut sync = env.client_for(Backend::Dropbox);

    sync.push(&source, "music/song.mp3", false).await?;
    let err = sync.push(&source, "music/song.mp3", false).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    Ok(())
}
