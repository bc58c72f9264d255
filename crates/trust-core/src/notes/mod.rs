// ============================================================================
// NoteStore - Embedded Database (redb)
// ============================================================================
// Persistent local storage for notes, partitioned by wallet identity.
// Default path: ~/.trust-notes/notes.redb (override via TRUST_NOTES_DB_PATH)
//
// Mutations return the stored record so callers update their in-memory view
// directly instead of reloading everything.
// ============================================================================

pub mod types;

pub use types::{Note, NoteDraft, NoteSort, MAX_TAGS};

use anyhow::{anyhow, Result};
use redb::{Database, TableDefinition};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::types::Identity;

const NOTES: TableDefinition<&str, &[u8]> = TableDefinition::new("notes");

/// Embedded note database
pub struct NoteStore {
    db: Database,
    path: PathBuf,
}

impl NoteStore {
    /// Open (or create) the database at the given path.
    /// If `path` is None, uses ~/.trust-notes/notes.redb
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let db_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let home =
                    dirs::home_dir().ok_or_else(|| anyhow!("Cannot determine home directory"))?;
                let dir = home.join(".trust-notes");
                std::fs::create_dir_all(&dir)
                    .map_err(|e| anyhow!("Failed to create .trust-notes directory: {}", e))?;
                dir.join("notes.redb")
            }
        };

        info!("Opening notes database at: {}", db_path.display());

        let db = Database::create(&db_path)
            .map_err(|e| anyhow!("Failed to open database: {}", e))?;

        // Ensure the table exists
        let write_txn = db
            .begin_write()
            .map_err(|e| anyhow!("Failed to begin write: {}", e))?;
        {
            let _ = write_txn
                .open_table(NOTES)
                .map_err(|e| anyhow!("Failed to create notes table: {}", e))?;
        }
        write_txn
            .commit()
            .map_err(|e| anyhow!("Failed to commit init: {}", e))?;

        Ok(Self { db, path: db_path })
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn get(&self, owner: &Identity, note_id: &str) -> Result<Option<Note>> {
        let key = note_key(owner, note_id);

        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| anyhow!("Failed to begin read: {}", e))?;
        let table = read_txn
            .open_table(NOTES)
            .map_err(|e| anyhow!("Failed to open notes table: {}", e))?;

        match table
            .get(key.as_str())
            .map_err(|e| anyhow!("Failed to get note: {}", e))?
        {
            Some(value) => Ok(Some(decode(value.value())?)),
            None => Ok(None),
        }
    }

    /// All of `owner`'s notes matching `query`, in `sort` order
    pub fn list(&self, owner: &Identity, query: Option<&str>, sort: NoteSort) -> Result<Vec<Note>> {
        let (start, end) = owner_range(owner);

        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| anyhow!("Failed to begin read: {}", e))?;
        let table = read_txn
            .open_table(NOTES)
            .map_err(|e| anyhow!("Failed to open notes table: {}", e))?;

        let mut results = Vec::new();
        let iter = table
            .range::<&str>(start.as_str()..end.as_str())
            .map_err(|e| anyhow!("Failed to iterate notes: {}", e))?;
        for entry in iter {
            let (_key, value) = entry.map_err(|e| anyhow!("Failed to read entry: {}", e))?;
            let note = decode(value.value())?;
            if query.map_or(true, |q| note.matches(q)) {
                results.push(note);
            }
        }

        results.sort_by(|a, b| sort.compare(a, b));
        Ok(results)
    }

    pub fn count(&self, owner: &Identity) -> Result<usize> {
        Ok(self.list(owner, None, NoteSort::default())?.len())
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    pub fn create(&self, owner: &Identity, draft: NoteDraft) -> Result<Note> {
        let draft = draft.normalized()?;
        let now = now_millis();
        let note = Note {
            id: uuid::Uuid::new_v4().to_string(),
            title: draft.title,
            content: draft.content,
            author: owner.to_string(),
            created_at: now,
            updated_at: now,
            tags: draft.tags,
        };

        self.put(owner, &note)?;
        info!("Created note {} for {}", note.id, owner.short());
        Ok(note)
    }

    /// Replace title, content and tags; bumps `updated_at`
    pub fn update(&self, owner: &Identity, note_id: &str, draft: NoteDraft) -> Result<Note> {
        let draft = draft.normalized()?;
        let mut note = self
            .get(owner, note_id)?
            .ok_or_else(|| anyhow!("Note not found: {}", note_id))?;

        note.title = draft.title;
        note.content = draft.content;
        note.tags = draft.tags;
        note.updated_at = now_millis().max(note.updated_at);

        self.put(owner, &note)?;
        debug!("Updated note {}", note_id);
        Ok(note)
    }

    /// Copy a note under a new id with a " (Copy)" title suffix
    pub fn duplicate(&self, owner: &Identity, note_id: &str) -> Result<Note> {
        let source = self
            .get(owner, note_id)?
            .ok_or_else(|| anyhow!("Note not found: {}", note_id))?;

        let now = now_millis();
        let copy = Note {
            id: uuid::Uuid::new_v4().to_string(),
            title: format!("{} (Copy)", source.title),
            created_at: now,
            updated_at: now,
            ..source
        };

        self.put(owner, &copy)?;
        info!("Duplicated note {} as {}", note_id, copy.id);
        Ok(copy)
    }

    pub fn delete(&self, owner: &Identity, note_id: &str) -> Result<bool> {
        let key = note_key(owner, note_id);

        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| anyhow!("Failed to begin write: {}", e))?;
        let removed;
        {
            let mut table = write_txn
                .open_table(NOTES)
                .map_err(|e| anyhow!("Failed to open notes table: {}", e))?;
            removed = table
                .remove(key.as_str())
                .map_err(|e| anyhow!("Failed to remove note: {}", e))?
                .is_some();
        }
        write_txn
            .commit()
            .map_err(|e| anyhow!("Failed to commit delete: {}", e))?;

        if removed {
            debug!("Deleted note: {}", note_id);
        }
        Ok(removed)
    }

    fn put(&self, owner: &Identity, note: &Note) -> Result<()> {
        let key = note_key(owner, &note.id);
        let value =
            bincode::serialize(note).map_err(|e| anyhow!("Failed to serialize note: {}", e))?;

        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| anyhow!("Failed to begin write: {}", e))?;
        {
            let mut table = write_txn
                .open_table(NOTES)
                .map_err(|e| anyhow!("Failed to open notes table: {}", e))?;
            table
                .insert(key.as_str(), value.as_slice())
                .map_err(|e| anyhow!("Failed to insert note: {}", e))?;
        }
        write_txn
            .commit()
            .map_err(|e| anyhow!("Failed to commit: {}", e))?;
        Ok(())
    }
}

/// Addresses are case-insensitive, so the partition key is lowercased
fn owner_prefix(owner: &Identity) -> String {
    format!("notes:{}:", owner.as_str().to_lowercase())
}

fn note_key(owner: &Identity, note_id: &str) -> String {
    format!("{}{}", owner_prefix(owner), note_id)
}

/// Half-open key range covering exactly one owner's notes
fn owner_range(owner: &Identity) -> (String, String) {
    let start = owner_prefix(owner);
    // ';' sorts immediately after ':'
    let end = format!("notes:{};", owner.as_str().to_lowercase());
    (start, end)
}

fn decode(bytes: &[u8]) -> Result<Note> {
    bincode::deserialize(bytes).map_err(|e| anyhow!("Failed to deserialize note: {}", e))
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ALICE: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const BOB: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    fn open_store() -> (TempDir, NoteStore) {
        let dir = TempDir::new().unwrap();
        let store = NoteStore::open(Some(&dir.path().join("notes.redb"))).unwrap();
        (dir, store)
    }

    #[test]
    fn test_create_and_get() {
        let (_dir, store) = open_store();
        let alice = Identity::new(ALICE);

        let note = store
            .create(&alice, NoteDraft::new(" Groceries ", "eggs").with_tags(["home"]))
            .unwrap();
        assert_eq!(note.title, "Groceries");
        assert_eq!(note.author, ALICE);
        assert_eq!(note.created_at, note.updated_at);

        assert_eq!(store.get(&alice, &note.id).unwrap(), Some(note));
    }

    #[test]
    fn test_create_rejects_invalid_draft() {
        let (_dir, store) = open_store();
        let alice = Identity::new(ALICE);
        assert!(store.create(&alice, NoteDraft::new("", "body")).is_err());
        assert_eq!(store.count(&alice).unwrap(), 0);
    }

    #[test]
    fn test_notes_partitioned_by_identity() {
        let (_dir, store) = open_store();
        let alice = Identity::new(ALICE);
        let bob = Identity::new(BOB);

        let note = store.create(&alice, NoteDraft::new("mine", "secret")).unwrap();
        store.create(&bob, NoteDraft::new("his", "other")).unwrap();

        assert_eq!(store.count(&alice).unwrap(), 1);
        assert_eq!(store.count(&bob).unwrap(), 1);
        assert!(store.get(&bob, &note.id).unwrap().is_none());
        assert!(!store.delete(&bob, &note.id).unwrap());

        // Checksummed and lowercase forms are the same owner
        let alice_upper = Identity::new(ALICE.to_uppercase().replacen("0X", "0x", 1));
        assert_eq!(store.count(&alice_upper).unwrap(), 1);
    }

    #[test]
    fn test_list_search_and_sort() {
        let (_dir, store) = open_store();
        let alice = Identity::new(ALICE);

        store.create(&alice, NoteDraft::new("Beta", "second")).unwrap();
        store
            .create(&alice, NoteDraft::new("alpha", "first").with_tags(["Travel"]))
            .unwrap();
        store.create(&alice, NoteDraft::new("Gamma", "third")).unwrap();

        let titles = |notes: Vec<Note>| notes.into_iter().map(|n| n.title).collect::<Vec<_>>();

        assert_eq!(
            titles(store.list(&alice, None, NoteSort::TitleAsc).unwrap()),
            vec!["alpha", "Beta", "Gamma"]
        );
        assert_eq!(
            titles(store.list(&alice, Some("travel"), NoteSort::Newest).unwrap()),
            vec!["alpha"]
        );
        assert_eq!(
            titles(store.list(&alice, Some("THIRD"), NoteSort::Newest).unwrap()),
            vec!["Gamma"]
        );
        assert!(store.list(&alice, Some("nothing"), NoteSort::Newest).unwrap().is_empty());
    }

    #[test]
    fn test_update() {
        let (_dir, store) = open_store();
        let alice = Identity::new(ALICE);
        let note = store.create(&alice, NoteDraft::new("Draft", "v1")).unwrap();

        let updated = store
            .update(&alice, &note.id, NoteDraft::new("Final", "v2").with_tags(["done"]))
            .unwrap();
        assert_eq!(updated.id, note.id);
        assert_eq!(updated.title, "Final");
        assert_eq!(updated.tags, vec!["done"]);
        assert_eq!(updated.created_at, note.created_at);
        assert!(updated.updated_at >= note.updated_at);
        assert_eq!(store.get(&alice, &note.id).unwrap(), Some(updated));

        assert!(store.update(&alice, "missing", NoteDraft::new("t", "c")).is_err());
    }

    #[test]
    fn test_duplicate() {
        let (_dir, store) = open_store();
        let alice = Identity::new(ALICE);
        let note = store
            .create(&alice, NoteDraft::new("Plan", "steps").with_tags(["a", "b"]))
            .unwrap();

        let copy = store.duplicate(&alice, &note.id).unwrap();
        assert_ne!(copy.id, note.id);
        assert_eq!(copy.title, "Plan (Copy)");
        assert_eq!(copy.content, note.content);
        assert_eq!(copy.tags, note.tags);
        assert_eq!(store.count(&alice).unwrap(), 2);
    }

    #[test]
    fn test_delete() {
        let (_dir, store) = open_store();
        let alice = Identity::new(ALICE);
        let note = store.create(&alice, NoteDraft::new("tmp", "x")).unwrap();

        assert!(store.delete(&alice, &note.id).unwrap());
        assert!(!store.delete(&alice, &note.id).unwrap());
        assert!(store.get(&alice, &note.id).unwrap().is_none());
    }

    #[test]
    fn test_reopen_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.redb");
        let alice = Identity::new(ALICE);

        let id = {
            let store = NoteStore::open(Some(&path)).unwrap();
            store.create(&alice, NoteDraft::new("keep", "me")).unwrap().id
        };

        let store = NoteStore::open(Some(&path)).unwrap();
        assert_eq!(store.path(), path.as_path());
        assert_eq!(store.get(&alice, &id).unwrap().map(|n| n.title), Some("keep".to_string()));
    }
}
