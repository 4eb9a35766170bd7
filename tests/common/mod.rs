#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use kvdump::client::Api;
use kvdump::{Error, ErrorKind, Key, Result};

/// Value held by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Data {
    String(Vec<u8>),
    Hash(Vec<(Vec<u8>, Vec<u8>)>),
    Set(Vec<Vec<u8>>),
    SortedSet(Vec<Vec<u8>>),
    List(Vec<Vec<u8>>),
}

impl Data {
    pub fn string(value: &str) -> Self {
        Data::String(value.as_bytes().to_vec())
    }

    fn type_name(&self) -> &'static str {
        match self {
            Data::String(_) => "string",
            Data::Hash(_) => "hash",
            Data::Set(_) => "set",
            Data::SortedSet(_) => "zset",
            Data::List(_) => "list",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub data: Data,
    // None means no expiry.
    pub ttl_ms: Option<i64>,
}

/// In memory store speaking the same command semantics as the real one.
///
/// DUMP payloads are json encoded [`Data`]. RESTORE of an existing key fails
/// with BUSYKEY like the store does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub entries: BTreeMap<Key, Entry>,
    // Every issued command name, in order.
    pub calls: Vec<&'static str>,
    fail_restore: HashSet<Key>,
    fail_dump: HashSet<Key>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, data: Data, ttl_ms: Option<i64>) {
        self.entries.insert(Key::from(key), Entry { data, ttl_ms });
    }

    pub fn with_strings(keys: &[(&str, &str)]) -> Self {
        let mut store = Self::new();
        for (key, value) in keys {
            store.insert(key, Data::string(value), None);
        }
        store
    }

    pub fn fail_restore_of(&mut self, key: &str) {
        self.fail_restore.insert(Key::from(key));
    }

    pub fn fail_dump_of(&mut self, key: &str) {
        self.fail_dump.insert(Key::from(key));
    }

    pub fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries.get(&Key::from(key))
    }

    fn data(&self, key: &Key) -> Option<&Data> {
        self.entries.get(key).map(|entry| &entry.data)
    }
}

fn command_err(command: &str, message: &str) -> Error {
    ErrorKind::Command {
        command: command.to_owned(),
        message: message.to_owned(),
    }
    .into()
}

fn wrong_type(command: &str) -> Error {
    command_err(
        command,
        "WRONGTYPE Operation against a key holding the wrong kind of value",
    )
}

fn bytes(values: &[Vec<u8>]) -> Vec<Bytes> {
    values.iter().cloned().map(Bytes::from).collect()
}

/// Store glob matching, `*` and `?` only.
pub fn glob_match(pattern: &[u8], name: &[u8]) -> bool {
    match (pattern.split_first(), name.split_first()) {
        (None, None) => true,
        (Some((b'*', rest)), _) => {
            glob_match(rest, name) || (!name.is_empty() && glob_match(pattern, &name[1..]))
        }
        (Some((b'?', rest)), Some((_, name_rest))) => glob_match(rest, name_rest),
        (Some((p, rest)), Some((n, name_rest))) => p == n && glob_match(rest, name_rest),
        _ => false,
    }
}

#[async_trait]
impl Api for MemoryStore {
    async fn keys(&mut self, pattern: &str) -> Result<Vec<Key>> {
        self.calls.push("KEYS");
        Ok(self
            .entries
            .keys()
            .filter(|key| glob_match(pattern.as_bytes(), key))
            .cloned()
            .collect())
    }

    async fn key_type(&mut self, key: &Key) -> Result<String> {
        self.calls.push("TYPE");
        Ok(self
            .data(key)
            .map(Data::type_name)
            .unwrap_or("none")
            .to_owned())
    }

    async fn pttl(&mut self, key: &Key) -> Result<i64> {
        self.calls.push("PTTL");
        Ok(match self.entries.get(key) {
            Some(Entry {
                ttl_ms: Some(ttl), ..
            }) => *ttl,
            Some(_) => -1,
            None => -2,
        })
    }

    async fn dump(&mut self, key: &Key) -> Result<Option<Bytes>> {
        self.calls.push("DUMP");
        if self.fail_dump.contains(key) {
            return Err(command_err("DUMP", "ERR injected failure"));
        }
        match self.data(key) {
            Some(data) => Ok(Some(Bytes::from(serde_json::to_vec(data)?))),
            None => Ok(None),
        }
    }

    async fn restore(&mut self, key: &Key, ttl_ms: i64, value: &[u8]) -> Result<()> {
        self.calls.push("RESTORE");
        if self.fail_restore.contains(key) {
            return Err(command_err("RESTORE", "ERR injected failure"));
        }
        if self.entries.contains_key(key) {
            return Err(command_err("RESTORE", "BUSYKEY Target key name already exists."));
        }
        let data: Data = serde_json::from_slice(value)
            .map_err(|_| command_err("RESTORE", "ERR DUMP payload version or checksum are wrong"))?;

        let ttl_ms = if ttl_ms > 0 { Some(ttl_ms) } else { None };
        self.entries.insert(key.clone(), Entry { data, ttl_ms });
        Ok(())
    }

    async fn delete(&mut self, key: &Key) -> Result<u64> {
        self.calls.push("DEL");
        Ok(self.entries.remove(key).map_or(0, |_| 1))
    }

    async fn get(&mut self, key: &Key) -> Result<Option<Bytes>> {
        self.calls.push("GET");
        match self.data(key) {
            Some(Data::String(value)) => Ok(Some(Bytes::from(value.clone()))),
            Some(_) => Err(wrong_type("GET")),
            None => Ok(None),
        }
    }

    async fn smembers(&mut self, key: &Key) -> Result<Vec<Bytes>> {
        self.calls.push("SMEMBERS");
        match self.data(key) {
            Some(Data::Set(members)) => Ok(bytes(members)),
            Some(_) => Err(wrong_type("SMEMBERS")),
            None => Ok(Vec::new()),
        }
    }

    async fn hgetall(&mut self, key: &Key) -> Result<Vec<(Bytes, Bytes)>> {
        self.calls.push("HGETALL");
        match self.data(key) {
            Some(Data::Hash(pairs)) => Ok(pairs
                .iter()
                .map(|(field, value)| (Bytes::from(field.clone()), Bytes::from(value.clone())))
                .collect()),
            Some(_) => Err(wrong_type("HGETALL")),
            None => Ok(Vec::new()),
        }
    }

    async fn hmget(&mut self, key: &Key, fields: &[String]) -> Result<Vec<Option<Bytes>>> {
        self.calls.push("HMGET");
        let pairs = match self.data(key) {
            Some(Data::Hash(pairs)) => pairs.as_slice(),
            Some(_) => return Err(wrong_type("HMGET")),
            None => &[],
        };
        Ok(fields
            .iter()
            .map(|field| {
                pairs
                    .iter()
                    .find(|(name, _)| name.as_slice() == field.as_bytes())
                    .map(|(_, value)| Bytes::from(value.clone()))
            })
            .collect())
    }

    async fn zrange(&mut self, key: &Key) -> Result<Vec<Bytes>> {
        self.calls.push("ZRANGE");
        match self.data(key) {
            Some(Data::SortedSet(members)) => Ok(bytes(members)),
            Some(_) => Err(wrong_type("ZRANGE")),
            None => Ok(Vec::new()),
        }
    }

    async fn lrange(&mut self, key: &Key) -> Result<Vec<Bytes>> {
        self.calls.push("LRANGE");
        match self.data(key) {
            Some(Data::List(items)) => Ok(bytes(items)),
            Some(_) => Err(wrong_type("LRANGE")),
            None => Ok(Vec::new()),
        }
    }
}
