use filesave_core::{
    files::FileBody, resolve_options, size_to_bytes, AppConfig, FileManager, FileStorage,
    FormEntry, MessageCatalog, Multiple, SaveError, SubmittedFile, Translate, UploadError,
    UploadOptions,
};
use tempfile::TempDir;

fn manager(config: &AppConfig, mount: &std::path::Path) -> FileManager {
    FileManager::new(&config.file_save).with_storage(FileStorage::new(mount))
}

#[test]
fn test_size_expressions() {
    assert_eq!(size_to_bytes("1KB").unwrap(), 1024);
    assert_eq!(size_to_bytes("2 mb").unwrap(), 2 * 1024 * 1024);
    assert_eq!(size_to_bytes("512B").unwrap(), 512);
    assert!(matches!(
        size_to_bytes("big"),
        Err(UploadError::MalformedSizeExpression { .. })
    ));
}

#[test]
fn test_three_layer_resolution() {
    let call_site = UploadOptions::new().multiple(false);
    let configured = UploadOptions::new()
        .form_key("attachments")
        .multiple(5u32)
        .max_size("10MB");

    let constraint = resolve_options([&call_site, &configured]);

    assert_eq!(constraint.form_key, "attachments");
    assert_eq!(constraint.multiple, Multiple::Single);
    assert_eq!(constraint.ensure.max_size.as_deref(), Some("10MB"));
    assert_eq!(constraint.lang, "en");
}

#[tokio::test]
async fn test_configured_options_drive_validation_and_storage() {
    let mount = TempDir::new().unwrap();
    let mut config = AppConfig::default();
    config.file_save.options = UploadOptions::new().types(["pdf"]).max_size("1KB");
    let manager = manager(&config, mount.path());

    let entries: Vec<FormEntry> = vec![
        SubmittedFile::from_bytes("report.pdf", "application/pdf", "%PDF-1.7").into(),
    ];
    let files = manager.verify(entries, &UploadOptions::new()).unwrap();
    let url = manager
        .save(&files[0], Some("quarterly"), Some("reports/2024"))
        .await
        .unwrap();

    assert_eq!(url, "reports/2024/quarterly.pdf");
    assert_eq!(
        std::fs::read(mount.path().join(&url)).unwrap(),
        b"%PDF-1.7"
    );
}

#[test]
fn test_rejections_carry_codes_and_localized_messages() {
    let config = AppConfig::default();
    let mount = TempDir::new().unwrap();
    let manager = manager(&config, mount.path());

    let entries = vec![SubmittedFile::from_bytes("big.png", "image/png", vec![0u8; 2048]).into()];
    let err = manager
        .verify(entries, &UploadOptions::new().max_size("1KB"))
        .unwrap_err();

    assert_eq!(err.code(), 1002);
    assert_eq!(err.to_string(), "File too heavy. Max size is: 1KB");
    assert_eq!(err.localized("en"), "File too heavy. Max size is: 1KB");

    let catalog = MessageCatalog::new("zh");
    assert_eq!(err.message_with(&catalog), "文件过大，最大允许：1KB");
    catalog.switch_locale("fr");
    assert_eq!(err.message_with(&catalog), "File too heavy. Max size is: 1KB");
}

#[test]
fn test_rejection_leaves_nothing_on_disk() {
    let mount = TempDir::new().unwrap();
    let manager = manager(&AppConfig::default(), mount.path());

    let entries = vec![
        SubmittedFile::from_bytes("a.png", "image/png", "a").into(),
        FormEntry::Text("oops".to_string()),
    ];
    let err = manager
        .verify(entries, &UploadOptions::new().types(["image"]))
        .unwrap_err();

    assert_eq!(err, UploadError::InvalidFile);
    assert_eq!(std::fs::read_dir(mount.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_spooled_body_is_saved_intact() {
    let mount = TempDir::new().unwrap();
    let storage = FileStorage::new(mount.path());

    let data = vec![42u8; 8192];
    let mut temp = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(&mut temp, &data).unwrap();
    let file = SubmittedFile::spooled("blob.bin", "application/octet-stream", data.len() as u64, temp);
    assert!(matches!(file.body(), FileBody::Spooled(_)));

    let url = storage.save(&file, None, Some("spool")).await.unwrap();

    assert_eq!(url, "spool/blob.bin");
    assert_eq!(std::fs::read(mount.path().join(url)).unwrap(), data);
}

#[tokio::test]
async fn test_save_failure_is_returned_not_raised() {
    let mount = TempDir::new().unwrap();
    let storage = FileStorage::new(mount.path());
    let file = SubmittedFile::from_bytes("a.txt", "text/plain", "a");

    let result = storage.save(&file, Some("../../escape"), None).await;

    assert!(matches!(result, Err(SaveError::InvalidPath(_))));
}
