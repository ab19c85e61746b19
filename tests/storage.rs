use jmd_backoffice_api::notify::{LocalStorage, Storage};

#[tokio::test]
async fn local_storage_writes_nested_keys_and_deletes_idempotently() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = LocalStorage::new(dir.path().join("files"), "http://127.0.0.1:3000/files/").await?;

    let stored = storage
        .upload("bills/JMD-BILL-202403-0001.pdf", b"%PDF-1.4".to_vec(), "application/pdf")
        .await?;
    assert_eq!(stored.size, 8);
    assert_eq!(
        stored.url,
        "http://127.0.0.1:3000/files/bills/JMD-BILL-202403-0001.pdf"
    );

    let path = dir.path().join("files/bills/JMD-BILL-202403-0001.pdf");
    assert_eq!(tokio::fs::read(&path).await?, b"%PDF-1.4");

    storage.delete("bills/JMD-BILL-202403-0001.pdf").await?;
    assert!(!path.exists());
    storage.delete("bills/JMD-BILL-202403-0001.pdf").await?;
    Ok(())
}
