//! Pipe-delimited flat-file port for contacts.
//!
//! # Responsibility
//! - Persist contacts as one line per record, fields joined by `|`.
//! - Rewrite the whole file on every mutation.
//!
//! # Invariants
//! - Field order is `name|phone|email|address`.
//! - Line breaks and backslashes inside a field are written as `\n`, `\r` and
//!   `\\` so every record stays on one line.
//! - The file is replaced via a sibling temp file and a rename, never
//!   truncated in place.
//! - After a failed read the port refuses writes, so an unreadable file is
//!   never overwritten with an empty collection.
//!
//! # Compatibility
//! Files from writers that did not escape backslashes are read lossily: a raw
//! `C:\new` in an address decodes to `C:` followed by a line break and `ew`.
//! Such values are rewritten in escaped form on the next mutation.

use crate::model::contact::{Contact, FIELD_DELIMITER};
use crate::model::record::{Entry, Handle};
use crate::storage::{StorageError, StoragePort, StorageResult};
use log::{error, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const FIELD_COUNT: usize = 4;

/// Contacts file port. Handles are process-local and start at 1.
#[derive(Debug)]
pub struct FlatFileStorage {
    path: PathBuf,
    rows: Vec<Entry<Contact>>,
    next_handle: u64,
    unreadable: bool,
}

impl FlatFileStorage {
    /// Creates a port for `path`. The file is not touched until `read_all` or
    /// the first mutation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            rows: Vec::new(),
            next_handle: 1,
            unreadable: false,
        }
    }

    fn allocate(&mut self) -> Handle {
        let handle = Handle::new(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn position(&self, handle: Handle) -> StorageResult<usize> {
        self.rows
            .iter()
            .position(|entry| entry.handle == handle)
            .ok_or(StorageError::MissingRow(handle))
    }

    /// Writes `rows` to disk, committing them as the mirrored state on success.
    fn commit(&mut self, rows: Vec<Entry<Contact>>) -> StorageResult<()> {
        if self.unreadable {
            return Err(StorageError::InvalidData(format!(
                "refusing to overwrite unreadable contacts file `{}`",
                self.path.display()
            )));
        }

        let mut body = String::new();
        for entry in &rows {
            body.push_str(&encode_line(&entry.record)?);
            body.push('\n');
        }

        let tmp_path = temp_path(&self.path);
        let written = fs::write(&tmp_path, body).and_then(|()| fs::rename(&tmp_path, &self.path));
        if let Err(err) = written {
            let _ = fs::remove_file(&tmp_path);
            error!(
                "event=flat_file_write module=storage status=error rows={} error={}",
                rows.len(),
                err
            );
            return Err(err.into());
        }

        self.rows = rows;
        Ok(())
    }
}

impl StoragePort<Contact> for FlatFileStorage {
    fn read_all(&mut self) -> StorageResult<Vec<Entry<Contact>>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                self.unreadable = false;
                self.rows.clear();
                return Ok(Vec::new());
            }
            Err(err) => {
                self.unreadable = true;
                return Err(err.into());
            }
        };

        let mut rows = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match decode_line(line) {
                Ok(contact) => rows.push(Entry::new(self.allocate(), contact)),
                Err(err) => {
                    self.unreadable = true;
                    warn!(
                        "event=flat_file_read module=storage status=error line={} error_code=malformed_row",
                        index + 1
                    );
                    return Err(err);
                }
            }
        }

        self.unreadable = false;
        self.rows = rows.clone();
        Ok(rows)
    }

    fn insert(&mut self, record: &Contact) -> StorageResult<Handle> {
        let handle = Handle::new(self.next_handle);
        let mut rows = self.rows.clone();
        rows.push(Entry::new(handle, record.clone()));
        self.commit(rows)?;
        self.next_handle += 1;
        Ok(handle)
    }

    fn update(&mut self, handle: Handle, record: &Contact) -> StorageResult<()> {
        let index = self.position(handle)?;
        let mut rows = self.rows.clone();
        rows[index].record = record.clone();
        self.commit(rows)
    }

    fn delete(&mut self, handle: Handle) -> StorageResult<()> {
        let index = self.position(handle)?;
        let mut rows = self.rows.clone();
        rows.remove(index);
        self.commit(rows)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn encode_line(contact: &Contact) -> StorageResult<String> {
    let fields = [
        &contact.name,
        &contact.phone,
        &contact.email,
        &contact.address,
    ];
    let mut encoded = Vec::with_capacity(FIELD_COUNT);
    for field in fields {
        if field.contains(FIELD_DELIMITER) {
            return Err(StorageError::InvalidData(format!(
                "field contains delimiter `{FIELD_DELIMITER}`"
            )));
        }
        encoded.push(escape_field(field));
    }
    let separator = FIELD_DELIMITER.to_string();
    Ok(encoded.join(separator.as_str()))
}

fn decode_line(line: &str) -> StorageResult<Contact> {
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    if fields.len() != FIELD_COUNT {
        return Err(StorageError::InvalidData(format!(
            "expected {FIELD_COUNT} fields, found {}",
            fields.len()
        )));
    }
    Ok(Contact::new(
        unescape_field(fields[0]),
        unescape_field(fields[1]),
        unescape_field(fields[2]),
        unescape_field(fields[3]),
    ))
}

fn escape_field(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn unescape_field(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            unescaped.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => unescaped.push('\n'),
            Some('r') => unescaped.push('\r'),
            Some('\\') => unescaped.push('\\'),
            // Lone backslashes from hand-edited files are kept literally.
            Some(other) => {
                unescaped.push('\\');
                unescaped.push(other);
            }
            None => unescaped.push('\\'),
        }
    }
    unescaped
}

#[cfg(test)]
mod tests {
    use super::{decode_line, encode_line, escape_field, unescape_field};
    use crate::model::contact::Contact;
    use crate::storage::StorageError;

    #[test]
    fn multi_line_address_stays_on_one_line() {
        let contact = Contact::new("Ann", "123", "a@b.co", "1 Main St\nSpringfield");
        let line = encode_line(&contact).unwrap();
        assert_eq!(line, "Ann|123|a@b.co|1 Main St\\nSpringfield");
        assert_eq!(decode_line(&line).unwrap(), contact);
    }

    #[test]
    fn backslashes_survive_escaping() {
        let raw = r"C:\new\table";
        assert_eq!(unescape_field(&escape_field(raw)), raw);
    }

    #[test]
    fn unescaped_legacy_backslashes_decode_as_escapes_only_when_known() {
        assert_eq!(unescape_field(r"C:\new"), "C:\new");
        assert_eq!(unescape_field(r"C:\data"), r"C:\data");
        assert_eq!(unescape_field(r"trailing\"), r"trailing\");
    }

    #[test]
    fn decode_reads_legacy_rows_verbatim() {
        let contact = decode_line("Bob|555|bob@x.org|Elm Road").unwrap();
        assert_eq!(contact, Contact::new("Bob", "555", "bob@x.org", "Elm Road"));
    }

    #[test]
    fn decode_rejects_wrong_field_count() {
        let err = decode_line("Bob|555|bob@x.org").unwrap_err();
        assert!(matches!(err, StorageError::InvalidData(_)));
    }

    #[test]
    fn encode_rejects_embedded_delimiter() {
        let contact = Contact::new("Bo|b", "555", "bob@x.org", "");
        assert!(encode_line(&contact).is_err());
    }
}
