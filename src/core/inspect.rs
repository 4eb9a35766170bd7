use std::io::Write;

use bytes::Bytes;
use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Map, Value};

use crate::client::Api;
use crate::common::{ErrorKind, Result};
use crate::Key;

/// Value of a key as fetched for display.
#[derive(Debug, Clone, PartialEq)]
pub enum Contents {
    String(Bytes),
    // field, value. value is None for a requested field that does not exist.
    Hash(Vec<(Bytes, Option<Bytes>)>),
    Set(Vec<Bytes>),
    SortedSet(Vec<Bytes>),
    List(Vec<Bytes>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    pub key: Key,
    pub key_type: String,
    pub contents: Contents,
}

/// Inspector prints keys in human readable form.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inspector {
    // pretty print values holding json documents.
    json: bool,
}

impl Inspector {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub async fn inspect<A, W>(
        &self,
        api: &mut A,
        key: &Key,
        fields: &[String],
        out: &mut W,
    ) -> Result<()>
    where
        A: Api + ?Sized,
        W: Write,
    {
        let inspection = fetch(api, key, fields).await?;
        self.render(&inspection, out)
    }

    pub fn render<W: Write>(&self, inspection: &Inspection, out: &mut W) -> Result<()> {
        writeln!(out, "KEY: {}", inspection.key)?;
        writeln!(out, "TYP: {}", inspection.key_type)?;

        match &inspection.contents {
            Contents::String(value) => match self.json_value(value) {
                Some(doc) => writeln!(out, "{}\n", to_pretty(&doc)?)?,
                None => writeln!(out, "VAL: {}\n", String::from_utf8_lossy(value))?,
            },
            Contents::Hash(pairs) => {
                let mut object = Map::new();
                for (field, value) in pairs {
                    let value = match value {
                        Some(value) => self
                            .json_value(value)
                            .unwrap_or_else(|| Value::String(lossy(value))),
                        None => Value::Null,
                    };
                    object.insert(lossy(field), value);
                }
                writeln!(out, "{}\n", to_pretty(&Value::Object(object))?)?;
            }
            Contents::Set(members) | Contents::SortedSet(members) | Contents::List(members) => {
                let members: Vec<String> = members.iter().map(|m| lossy(m)).collect();
                writeln!(out, "VAL: [{}]\n", members.join(" "))?;
            }
        }

        Ok(())
    }

    fn json_value(&self, value: &[u8]) -> Option<Value> {
        if self.json {
            serde_json::from_slice(value).ok()
        } else {
            None
        }
    }
}

/// Read a key with the command matching its type.
pub async fn fetch<A: Api + ?Sized>(api: &mut A, key: &Key, fields: &[String]) -> Result<Inspection> {
    let key_type = api.key_type(key).await?;

    let contents = match key_type.as_str() {
        "string" => {
            let value = api.get(key).await?.ok_or_else(|| ErrorKind::KeyNotFound {
                key: key.to_string(),
            })?;
            Contents::String(value)
        }
        "hash" if fields.is_empty() => Contents::Hash(
            api.hgetall(key)
                .await?
                .into_iter()
                .map(|(field, value)| (field, Some(value)))
                .collect(),
        ),
        "hash" => {
            let values = api.hmget(key, fields).await?;
            Contents::Hash(
                fields
                    .iter()
                    .map(|field| Bytes::copy_from_slice(field.as_bytes()))
                    .zip(values)
                    .collect(),
            )
        }
        "set" => Contents::Set(api.smembers(key).await?),
        "zset" => Contents::SortedSet(api.zrange(key).await?),
        "list" => Contents::List(api.lrange(key).await?),
        _ => {
            return Err(ErrorKind::UnsupportedType {
                key: key.to_string(),
                key_type: key_type.clone(),
            }
            .into())
        }
    };

    Ok(Inspection {
        key: key.clone(),
        key_type,
        contents,
    })
}

fn lossy(b: &[u8]) -> String {
    String::from_utf8_lossy(b).into_owned()
}

fn to_pretty(value: &Value) -> Result<String> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"\t"));
    value.serialize(&mut ser)?;

    Ok(lossy(&buf))
}
