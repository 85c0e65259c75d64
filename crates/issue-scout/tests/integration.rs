use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn scout_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("scout");
    path
}

fn setup_test_env() -> (TempDir, String) {
    let tmp = TempDir::new().unwrap();
    let db_url = format!("sqlite://{}", tmp.path().join("data/issues.sqlite").display());
    (tmp, db_url)
}

fn run_scout(dir: &Path, db_url: Option<&str>, args: &[&str]) -> (String, String, bool) {
    let binary = scout_binary();
    let mut cmd = Command::new(&binary);
    cmd.current_dir(dir)
        .args(args)
        .env_remove("DATABASE_URL")
        .env_remove("GITHUB_TOKEN")
        .env("RUST_LOG", "warn");
    if let Some(url) = db_url {
        cmd.env("DATABASE_URL", url);
    }
    let output = cmd
        .output()
        .unwrap_or_else(|e| panic!("Failed to run scout binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_init_creates_database() {
    let (tmp, db_url) = setup_test_env();
    let (stdout, stderr, success) = run_scout(tmp.path(), Some(&db_url), &["init"]);
    assert!(success, "init failed: {}", stderr);
    assert!(stdout.contains("Database initialized successfully."));
    assert!(tmp.path().join("data/issues.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (tmp, db_url) = setup_test_env();
    let (_, _, first) = run_scout(tmp.path(), Some(&db_url), &["init"]);
    let (_, stderr, second) = run_scout(tmp.path(), Some(&db_url), &["init"]);
    assert!(first);
    assert!(second, "second init failed: {}", stderr);
}

#[test]
fn test_stats_on_empty_store() {
    let (tmp, db_url) = setup_test_env();
    let (stdout, stderr, success) = run_scout(tmp.path(), Some(&db_url), &["stats"]);
    assert!(success, "stats failed: {}", stderr);
    assert!(stdout.contains("Collection:  github_issues"));
    assert!(stdout.contains("Documents:   0"));
}

#[test]
fn test_missing_database_url_is_fatal() {
    let (tmp, _) = setup_test_env();
    let (_, stderr, success) = run_scout(tmp.path(), None, &["init"]);
    assert!(!success);
    assert!(stderr.contains("DATABASE_URL environment variable not found"));
}

#[test]
fn test_database_url_from_dotenv() {
    let (tmp, db_url) = setup_test_env();
    fs::write(tmp.path().join(".env"), format!("DATABASE_URL={}\n", db_url)).unwrap();
    let (stdout, stderr, success) = run_scout(tmp.path(), None, &["init"]);
    assert!(success, "init with .env failed: {}", stderr);
    assert!(stdout.contains("Database initialized successfully."));
}

#[test]
fn test_search_rejects_zero_k() {
    let (tmp, db_url) = setup_test_env();
    let (_, stderr, success) =
        run_scout(tmp.path(), Some(&db_url), &["search", "crash", "--k", "0"]);
    assert!(!success);
    assert!(stderr.contains("k must be"), "unexpected stderr: {}", stderr);
}

#[test]
fn test_custom_collection_from_config() {
    let (tmp, db_url) = setup_test_env();
    let config_path = tmp.path().join("scout.toml");
    fs::write(&config_path, "[store]\ncollection = \"rust_issues\"\n").unwrap();

    let (stdout, stderr, success) = run_scout(
        tmp.path(),
        Some(&db_url),
        &["--config", config_path.to_str().unwrap(), "stats"],
    );
    assert!(success, "stats failed: {}", stderr);
    assert!(stdout.contains("Collection:  rust_issues"));
}

#[test]
fn test_invalid_config_rejected() {
    let (tmp, db_url) = setup_test_env();
    let config_path = tmp.path().join("scout.toml");
    fs::write(&config_path, "[agent]\nmax_steps = 0\n").unwrap();

    let (_, stderr, success) = run_scout(
        tmp.path(),
        Some(&db_url),
        &["--config", config_path.to_str().unwrap(), "stats"],
    );
    assert!(!success);
    assert!(stderr.contains("agent.max_steps"));
}

#[test]
fn test_missing_config_file_rejected() {
    let (tmp, db_url) = setup_test_env();
    let (_, stderr, success) = run_scout(
        tmp.path(),
        Some(&db_url),
        &["--config", "does-not-exist.toml", "stats"],
    );
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}

#[test]
fn test_non_sqlite_database_url_is_fatal() {
    let (tmp, _) = setup_test_env();
    let (_, stderr, success) = run_scout(
        tmp.path(),
        Some("postgres://user:pw@localhost:5432/vectordb"),
        &["init"],
    );
    assert!(!success);
    assert!(stderr.contains("DATABASE_URL must be a sqlite: URL or a file path"));
    assert!(!tmp.path().join("postgres:").exists());
}
