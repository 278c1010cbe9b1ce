//! Checkpoint store adapters.

use super::temp_workspace;
use crate::checkpoint::{
    adapters::{json_file::JsonFileCheckpointStore, memory::InMemoryCheckpointStore},
    domain::{Checkpoint, CheckpointId, FileSnapshot},
    ports::CheckpointStore,
};
use chrono::Utc;
use eyre::ensure;
use mockable::DefaultClock;
use rstest::rstest;
use std::fs;

fn sample() -> Checkpoint {
    Checkpoint::new(
        3,
        "before Edit src/lib.rs",
        vec![FileSnapshot::new(
            "/work/repo/src/lib.rs",
            "fn main() {}\n".to_owned(),
            Utc::now(),
        )],
        &DefaultClock,
    )
}

fn exercise_store(store: &impl CheckpointStore) -> eyre::Result<()> {
    let checkpoint = sample();
    store.save(&checkpoint)?;
    ensure!(store.load(checkpoint.id())? == Some(checkpoint.clone()));
    ensure!(store.list()? == [checkpoint.clone()]);
    ensure!(store.load(CheckpointId::new())?.is_none());

    ensure!(store.delete(checkpoint.id())?);
    ensure!(!store.delete(checkpoint.id())?);
    ensure!(store.list()?.is_empty());
    Ok(())
}

#[rstest]
fn in_memory_store_round_trips() -> eyre::Result<()> {
    exercise_store(&InMemoryCheckpointStore::new())
}

#[rstest]
fn json_store_round_trips() -> eyre::Result<()> {
    let (_guard, root) = temp_workspace()?;
    exercise_store(&JsonFileCheckpointStore::open(root.join("checkpoints"))?)
}

#[rstest]
fn json_store_writes_one_record_per_checkpoint() -> eyre::Result<()> {
    let (_guard, root) = temp_workspace()?;
    let store = JsonFileCheckpointStore::open(root.join("nested/checkpoints"))?;
    let checkpoint = sample();
    store.save(&checkpoint)?;

    let record = store.root().join(format!("{}.json", checkpoint.id()));
    let body = fs::read_to_string(&record)?;
    let parsed: Checkpoint = serde_json::from_str(&body)?;
    ensure!(parsed == checkpoint);
    Ok(())
}

#[rstest]
fn json_records_encode_content_as_base64() -> eyre::Result<()> {
    let (_guard, root) = temp_workspace()?;
    let store = JsonFileCheckpointStore::open(root.join("checkpoints"))?;
    let checkpoint = Checkpoint::new(
        0,
        "binary",
        vec![FileSnapshot::new(
            "/work/repo/img.bin",
            vec![0xff_u8, 0xfe, 0x00, 0x41],
            Utc::now(),
        )],
        &DefaultClock,
    );
    store.save(&checkpoint)?;

    let record = store.root().join(format!("{}.json", checkpoint.id()));
    let body: serde_json::Value = serde_json::from_str(&fs::read_to_string(&record)?)?;
    let encoded = body
        .pointer("/snapshots/0/content")
        .and_then(serde_json::Value::as_str);
    ensure!(encoded == Some("//4AQQ=="));
    ensure!(store.load(checkpoint.id())? == Some(checkpoint));
    Ok(())
}

#[rstest]
fn json_store_skips_unreadable_records() -> eyre::Result<()> {
    let (_guard, root) = temp_workspace()?;
    let store = JsonFileCheckpointStore::open(root.clone())?;
    let checkpoint = sample();
    store.save(&checkpoint)?;
    fs::write(root.join("broken.json"), "{ not json")?;
    fs::write(root.join(".pending.json.tmp"), "{}")?;
    fs::write(root.join("notes.txt"), "ignore me")?;

    ensure!(store.list()? == [checkpoint]);
    Ok(())
}
