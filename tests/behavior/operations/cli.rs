use crate::*;
use assert_cmd::prelude::*;
use libtest_mimic::Trial;
use predicates::prelude::*;

pub fn tests(tests: &mut Vec<Trial>) {
    tests.extend(async_trials!(
        e2e_test_avail_needs_no_configuration,
        e2e_test_missing_provider_fails,
        e2e_test_push_then_list,
        e2e_test_pull_prints_size_and_writes_file,
        e2e_test_pull_refuses_existing_local_file,
        e2e_test_pull_recursive_empty_directory,
        e2e_test_rmdir_non_empty_fails,
        e2e_test_mkdir_size_and_rm,
    ));
}

async fn e2e_test_avail_needs_no_configuration(_env: TestEnv) -> TestResult {
    base_cmd()
        .arg("avail")
        .assert()
        .success()
        .stdout(predicate::str::contains("local"))
        .stdout(predicate::str::contains("Amazon S3"))
        .stdout(predicate::str::contains("Azure Storage"));
    Ok(())
}

async fn e2e_test_missing_provider_fails(_env: TestEnv) -> TestResult {
    base_cmd()
        .args(["ls", "/"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "Error: Environment variable 'STORAGE_PROVIDER' is required but not found",
        ));
    Ok(())
}

async fn e2e_test_push_then_list(env: TestEnv) -> TestResult {
    let content = random_content(1..32 * 1024);
    env.write_local("upload.bin", &content);

    env.command()
        .args(["push", "upload.bin", "incoming"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Uploaded upload.bin to incoming/upload.bin"));
    assert_eq!(env.read_remote("incoming/upload.bin").await, content);

    env.command()
        .args(["ls", "--tree"])
        .assert()
        .success()
        .stdout("/\n└── incoming\n    └── upload.bin\n");

    env.command()
        .args(["push", "upload.bin", "incoming"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists at 'incoming/upload.bin'"));
    Ok(())
}

async fn e2e_test_pull_prints_size_and_writes_file(env: TestEnv) -> TestResult {
    env.write_remote("reports/q1.csv", vec![b'x'; 2048]).await;
    std::fs::create_dir(env.local_path("downloads"))?;

    env.command()
        .args(["pull", "reports/q1.csv", "downloads"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pulling reports/q1.csv (2.0 KiB)"));

    assert_eq!(std::fs::read(env.local_path("downloads/q1.csv"))?, vec![b'x'; 2048]);
    Ok(())
}

async fn e2e_test_pull_refuses_existing_local_file(env: TestEnv) -> TestResult {
    env.write_remote("a.txt", "remote").await;
    env.write_local("a.txt", "local");

    env.command()
        .args(["pull", "a.txt"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Resource already exists at local path"));

    assert_eq!(std::fs::read(env.local_path("a.txt"))?, b"local");
    Ok(())
}

async fn e2e_test_pull_recursive_empty_directory(env: TestEnv) -> TestResult {
    env.operator.create_dir("empty/").await?;

    env.command()
        .args(["pull", "-r", "empty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pulling empty (0.0 B)"));

    assert!(env.local_path("empty").is_dir());
    assert_eq!(std::fs::read_dir(env.local_path("empty"))?.count(), 0);
    Ok(())
}

async fn e2e_test_rmdir_non_empty_fails(env: TestEnv) -> TestResult {
    env.write_remote("keep/file.txt", "data").await;

    env.command()
        .args(["rmdir", "keep"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is non-empty"));

    env.command()
        .args(["rmdir", "-r", "keep"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed directory keep/"));
    assert!(!env.remote_exists("keep"));
    Ok(())
}

async fn e2e_test_mkdir_size_and_rm(env: TestEnv) -> TestResult {
    env.command()
        .args(["mkdir", "-p", "x/y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created directory x/y/"));
    assert!(env.remote_root().join("x/y").is_dir());

    env.write_remote("x/y/z.bin", vec![0u8; 1536]).await;
    env.command()
        .args(["size", "x"])
        .assert()
        .success()
        .stdout("1.5 KiB\tx\n");

    env.command()
        .args(["rm", "x/y/z.bin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted x/y/z.bin"));
    assert!(!env.remote_exists("x/y/z.bin"));
    Ok(())
}
