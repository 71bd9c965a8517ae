use crate::*;
use libtest_mimic::Trial;
use stowage::error::ErrorKind;
use stowage::storage::{Backend, Client};

pub fn tests(tests: &mut Vec<Trial>) {
    tests.extend(async_trials!(
        test_list_root_children,
        test_list_subdirectory_as_tree,
        test_list_missing_directory,
        test_list_per_directory_walk_matches_recursive,
        test_list_reflects_push_without_reconnecting,
    ));
}

async fn seed(env: &TestEnv) {
    env.write_remote("readme.md", "hello").await;
    env.write_remote("docs/guide.md", "guide").await;
    env.write_remote("docs/img/logo.png", vec![1u8, 2, 3]).await;
    env.operator.create_dir("empty/").await.expect("create empty dir");
}

async fn test_list_root_children(env: TestEnv) -> TestResult {
    seed(&env).await;
    let mut client = env.client();

    assert_eq!(client.list("/", false).await?, "docs/\nempty/\nreadme.md");
    assert_eq!(client.list("", false).await?, client.list("//", false).await?);
    Ok(())
}

async fn test_list_subdirectory_as_tree(env: TestEnv) -> TestResult {
    seed(&env).await;
    let mut client = env.client();

    let expected = "docs\n├── img\n│   └── logo.png\n└── guide.md";
    assert_eq!(client.list("/docs/", true).await?, expected);
    Ok(())
}

async fn test_list_missing_directory(env: TestEnv) -> TestResult {
    seed(&env).await;
    let mut client = env.client();

    let err = client.list("docs/nope", false).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "Remote resource 'docs/nope' not found");
    Ok(())
}

async fn test_list_per_directory_walk_matches_recursive(env: TestEnv) -> TestResult {
    seed(&env).await;

    let recursive = env.client_for(Backend::Fs).list("/", true).await?;
    for backend in [Backend::S3, Backend::AzureFile, Backend::Dropbox] {
        let rendered = env.client_for(backend).list("/", true).await?;
        assert_eq!(rendered, recursive, "tree built for {backend:?} differs");
    }
    Ok(())
}

async fn test_list_reflects_push_without_reconnecting(env: TestEnv) -> TestResult {
    seed(&env).await;
    let mut client = env.client();
    assert_eq!(client.list("docs", false).await?, "img/\nguide.md");

    let source = env.write_local("faq.md", "q&a");
    client.push(&source, "docs/faq.md", false).await?;

    assert_eq!(client.list("docs", false).await?, "img/\nfaq.md\nguide.md");
    Ok(())
}
