use nextgen_image_cache::{
    app::App,
    models::{Config, ConversionCheck, ConversionStatus},
    Error,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn setup_shop() -> (TempDir, Config) {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("pub/media/catalog")).unwrap();

    let config = Config {
        root_dir: dir.path().to_path_buf(),
        public_dir: dir.path().join("pub"),
        base_url: "https://shop.test/".to_string(),
        destination_suffix: ".webp".to_string(),
        debug: true,
    };
    (dir, config)
}

fn write_with_mtime(path: &Path, content: &[u8], age: Duration) {
    fs::write(path, content).unwrap();
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - age).unwrap();
}

fn expect_checked(status: ConversionStatus) -> ConversionCheck {
    match status {
        ConversionStatus::Checked(check) => check,
        other => panic!("expected a checked status, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_destination_needs_conversion() {
    let (dir, config) = setup_shop();
    let source = dir.path().join("pub/media/catalog/shoe.png");
    write_with_mtime(&source, &[7u8; 500], Duration::from_secs(60));

    let app = App::new(&config).unwrap();
    let statuses = app
        .run(&["https://shop.test/media/catalog/shoe.png".to_string()])
        .await;

    assert_eq!(statuses.len(), 1);
    let check = expect_checked(statuses[0].clone());
    assert_eq!(check.source, source);
    assert_eq!(check.destination, dir.path().join("pub/media/catalog/shoe.webp"));
    assert!(check.writable);
    assert!(check.needs_conversion);
    assert_eq!(check.verdict(), "convert");
}

#[tokio::test]
async fn test_fresh_destination_is_up_to_date() {
    let (dir, config) = setup_shop();
    let source = dir.path().join("pub/media/catalog/shoe.jpg");
    let destination = dir.path().join("pub/media/catalog/shoe.webp");
    write_with_mtime(&source, &[7u8; 500], Duration::from_secs(3600));
    write_with_mtime(&destination, &[8u8; 200], Duration::from_secs(60));

    let app = App::new(&config).unwrap();
    let check = expect_checked(app.check("/media/catalog/shoe.jpg").await.unwrap());

    assert!(check.destination_exists);
    assert!(!check.stale);
    assert!(!check.needs_conversion);
    assert!(check.destination_modified > check.source_modified);
    assert_eq!(check.verdict(), "up to date");
}

#[tokio::test]
async fn test_outdated_destination_is_kept() {
    let (dir, config) = setup_shop();
    let source = dir.path().join("pub/media/catalog/shoe.png");
    let destination = dir.path().join("pub/media/catalog/shoe.webp");
    write_with_mtime(&source, &[7u8; 500], Duration::from_secs(60));
    write_with_mtime(&destination, &[8u8; 200], Duration::from_secs(3600));

    let app = App::new(&config).unwrap();
    let check = expect_checked(app.check("/media/catalog/shoe.png").await.unwrap());

    assert!(check.stale);
    assert!(!check.needs_conversion);
    assert!(!app.resolver().is_newer_than(&destination, &source).await);
}

#[tokio::test]
async fn test_zero_byte_destination_is_regenerated() {
    let (dir, config) = setup_shop();
    let source = dir.path().join("pub/media/catalog/shoe.png");
    let destination = dir.path().join("pub/media/catalog/shoe.webp");
    write_with_mtime(&source, &[7u8; 500], Duration::from_secs(3600));
    write_with_mtime(&destination, &[], Duration::from_secs(60));

    let app = App::new(&config).unwrap();
    let check = expect_checked(app.check("/media/catalog/shoe.png").await.unwrap());

    assert!(!check.destination_exists);
    assert!(check.needs_conversion);
}

#[tokio::test]
async fn test_filesystem_paths_skip_url_conversion() {
    let (dir, config) = setup_shop();
    let source = dir.path().join("pub/media/catalog/shoe.png");
    write_with_mtime(&source, &[7u8; 500], Duration::from_secs(60));

    let app = App::new(&config).unwrap();
    let uri = source.to_str().unwrap();

    assert_eq!(app.resolver().resolve(uri).await.unwrap(), PathBuf::from(uri));
    assert!(app.resolver().uri_exists(uri).await.unwrap());
}

#[tokio::test]
async fn test_unresolvable_urls_are_reported() {
    let (_dir, config) = setup_shop();
    let app = App::new(&config).unwrap();

    let statuses = app
        .run(&[
            "https://shop.test/media/catalog/missing.png".to_string(),
            "https://elsewhere.test/media/catalog/shoe.png".to_string(),
        ])
        .await;

    assert!(statuses
        .iter()
        .all(|status| matches!(status, ConversionStatus::Unresolved { .. })));
    assert!(matches!(
        app.resolver().uri_exists("/media/catalog/missing.png").await,
        Err(Error::Resolution(_))
    ));
}

#[tokio::test]
async fn test_is_writable_for_new_files_checks_parent_directory() {
    let (dir, config) = setup_shop();
    let app = App::new(&config).unwrap();

    assert!(app
        .resolver()
        .is_writable(&dir.path().join("pub/media/catalog/new.webp"))
        .await
        .unwrap());
    assert!(!app
        .resolver()
        .is_writable(&dir.path().join("pub/media/absent/new.webp"))
        .await
        .unwrap());
}

#[cfg(unix)]
#[tokio::test]
async fn test_is_writable_for_new_files_in_locked_directory() {
    use std::os::unix::fs::PermissionsExt;

    let (dir, config) = setup_shop();
    let locked = dir.path().join("pub/media/locked");
    fs::create_dir(&locked).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();
    let app = App::new(&config).unwrap();

    let reported = app
        .resolver()
        .is_writable(&locked.join("new.webp"))
        .await
        .unwrap();
    let can_create = fs::write(locked.join("new.webp"), b"webp").is_ok();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(reported, can_create);
}

#[tokio::test]
async fn test_image_paths_resolve_below_configured_public_dir() {
    let (dir, mut config) = setup_shop();
    config.public_dir = dir.path().join("public_html");
    let app = App::new(&config).unwrap();

    assert_eq!(
        app.resolver()
            .absolute_path_from_image_path("/media/catalog/shoe.png"),
        dir.path().join("public_html/media/catalog/shoe.png")
    );
}

#[tokio::test]
async fn test_json_report() {
    let (dir, config) = setup_shop();
    write_with_mtime(
        &dir.path().join("pub/media/catalog/logo.gif"),
        &[1u8; 10],
        Duration::from_secs(60),
    );

    let app = App::new(&config).unwrap();
    let statuses = app.run(&["/media/catalog/logo.gif".to_string()]).await;
    let json = serde_json::to_value(&statuses).unwrap();

    assert_eq!(
        json,
        serde_json::json!([{
            "status": "skipped",
            "uri": "/media/catalog/logo.gif",
            "source": dir.path().join("pub/media/catalog/logo.gif"),
            "reason": "not a JPEG or PNG image",
        }])
    );
}
