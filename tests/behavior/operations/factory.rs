use crate::*;
use libtest_mimic::Trial;
use stowage::error::ErrorKind;
use stowage::storage::credentials::Credentials;
use stowage::storage::{Backend, Client, ClientFactory};

pub fn tests(tests: &mut Vec<Trial>) {
    tests.extend(async_trials!(
        test_factory_lists_registered_backends,
        test_factory_rejects_unknown_backend,
        test_factory_rejects_incomplete_credentials,
        test_factory_builds_working_local_client,
        test_probe_failure_is_remembered,
    ));
    #[cfg(feature = "s3")]
    tests.extend(async_trials!(test_unreachable_object_store_is_network_error));
}

async fn test_factory_lists_registered_backends(_env: TestEnv) -> TestResult {
    let ids: Vec<_> = ClientFactory::available().map(|r| r.id).collect();
    assert_eq!(ids, vec!["s3", "azure", "dropbox", "local"]);

    let names: Vec<_> = ClientFactory::available()
        .map(|r| r.friendly_name)
        .collect();
    assert_eq!(
        names,
        vec!["Amazon S3", "Azure Storage", "Dropbox", "Local Filesystem"]
    );
    Ok(())
}

async fn test_factory_rejects_unknown_backend(_env: TestEnv) -> TestResult {
    let err = ClientFactory::for_backend("floppy", &Credentials::new())
        .err()
        .expect("unknown backend must be rejected");
    assert_eq!(err.kind(), ErrorKind::InvalidBackend);
    assert_eq!(err.to_string(), "Unsupported storage backend: floppy");
    Ok(())
}

async fn test_factory_rejects_incomplete_credentials(_env: TestEnv) -> TestResult {
    let credentials = Credentials::new()
        .with("access_key", "AKIA")
        .with("secret_access_key", "secret")
        .with("region", "us-east-1");
    let err = ClientFactory::for_backend("aws_s3", &credentials)
        .err()
        .expect("missing bucket_name must be rejected");
    assert_eq!(err.kind(), ErrorKind::InvalidCredentials);
    assert_eq!(err.to_string(), "Invalid credentials given for 'Amazon S3'");
    Ok(())
}

async fn test_factory_builds_working_local_client(env: TestEnv) -> TestResult {
    env.write_remote("hello.txt", "hi").await;
    let credentials =
        Credentials::new().with("root_path", env.remote_root().to_string_lossy().to_string());

    let mut client = ClientFactory::for_backend("local", &credentials)?;
    assert_eq!(client.backend(), Backend::Fs);
    assert_eq!(client.list("/", false).await?, "hello.txt");
    Ok(())
}

async fn test_probe_failure_is_remembered(env: TestEnv) -> TestResult {
    // The root's parent is a regular file, so the root can never be created.
    let blocker = env.local_path("blocker");
    std::fs::write(&blocker, "plain file")?;
    let root = blocker.join("root");
    let credentials = Credentials::new().with("root_path", root.to_string_lossy().to_string());
    let mut client = ClientFactory::for_backend("local", &credentials)?;

    let first = client.list("/", false).await.unwrap_err();
    assert_eq!(first.kind(), ErrorKind::NetworkOrConfig);

    // Clearing the obstacle does not revive a rejected client...
    std::fs::remove_file(&blocker)?;
    let second = client.filesize("/").await.unwrap_err();
    assert_eq!(second.kind(), ErrorKind::NetworkOrConfig);
    assert_eq!(second.to_string(), first.to_string());
    assert!(!blocker.exists());

    // ...but a new one connects.
    let mut fresh = ClientFactory::for_backend("local", &credentials)?;
    assert_eq!(fresh.list("/", false).await?, "");
    assert!(root.is_dir());
    Ok(())
}

#[cfg(feature = "s3")]
async fn test_unreachable_object_store_is_network_error(_env: TestEnv) -> TestResult {
    let credentials = Credentials::new()
        .with("access_key", "AKIAEXAMPLE")
        .with("secret_access_key", "secret")
        .with("region", "us-east-1")
        .with("bucket_name", "unreachable")
        .with("endpoint", "http://127.0.0.1:1");
    let mut client = ClientFactory::for_backend("s3", &credentials)?;

    for _ in 0..2 {
        let err = client.list("/", false).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkOrConfig);
    }
    Ok(())
}
