// Parsers for the `key=value` style flags used when creating transfers and
// deployments: storage mappings, network maps, minion pool mappings and
// user scripts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Split `key=value` on the last `=`. Both halves are trimmed and must be
/// non-empty.
pub fn parse_key_value(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .rsplit_once('=')
        .ok_or_else(|| Error::InvalidArgument(format!("expected key=value, got {s:?}")))?;
    let (key, value) = (key.trim(), value.trim());
    if key.is_empty() || value.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "expected key=value with both sides set, got {s:?}"
        )));
    }
    Ok((key.to_owned(), value.to_owned()))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiskMapping {
    pub disk_id: String,
    pub destination: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BackendMapping {
    pub source: String,
    pub destination: String,
}

/// Storage placement for a transfer: an optional default backend, per disk
/// overrides and source backend to destination backend translations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StorageMappings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disk_mappings: Vec<DiskMapping>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub backend_mappings: Vec<BackendMapping>,
}

impl StorageMappings {
    pub fn from_args<S: AsRef<str>>(
        default: Option<&str>,
        disk_args: &[S],
        backend_args: &[S],
    ) -> Result<Self> {
        let mut mappings = StorageMappings {
            default: default
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
            ..Default::default()
        };
        for arg in disk_args {
            let (disk_id, destination) = parse_key_value(arg.as_ref())?;
            mappings.disk_mappings.push(DiskMapping {
                disk_id,
                destination,
            });
        }
        for arg in backend_args {
            let (source, destination) = parse_key_value(arg.as_ref())?;
            mappings.backend_mappings.push(BackendMapping {
                source,
                destination,
            });
        }
        Ok(mappings)
    }

    pub fn is_empty(&self) -> bool {
        self.default.is_none() && self.disk_mappings.is_empty() && self.backend_mappings.is_empty()
    }
}

fn parse_unique_map<S: AsRef<str>>(args: &[S], what: &str) -> Result<Map<String, Value>> {
    let mut map = Map::new();
    for arg in args {
        let (key, value) = parse_key_value(arg.as_ref())?;
        if map.contains_key(&key) {
            return Err(Error::InvalidArgument(format!(
                "{what} for {key:?} given more than once"
            )));
        }
        map.insert(key, Value::String(value));
    }
    Ok(map)
}

/// `source_network=destination_network` pairs.
pub fn parse_network_map<S: AsRef<str>>(args: &[S]) -> Result<Map<String, Value>> {
    parse_unique_map(args, "network mapping")
}

/// `instance=minion_pool_id` pairs used for OS morphing.
pub fn parse_minion_pool_mappings<S: AsRef<str>>(args: &[S]) -> Result<Map<String, Value>> {
    parse_unique_map(args, "minion pool mapping")
}

pub const USER_SCRIPT_OS_TYPES: [&str; 2] = ["linux", "windows"];

/// Script bodies keyed by OS type (applied to every instance) and by
/// instance name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UserScripts {
    pub global: BTreeMap<String, String>,
    pub instances: BTreeMap<String, String>,
}

impl UserScripts {
    pub fn from_args<S: AsRef<str>>(global_args: &[S], instance_args: &[S]) -> Result<Self> {
        let mut scripts = UserScripts::default();
        for arg in global_args {
            let (os_type, path) = parse_script_arg(arg.as_ref())?;
            let os_type = os_type.to_lowercase();
            if !USER_SCRIPT_OS_TYPES.contains(&os_type.as_str()) {
                return Err(Error::InvalidArgument(format!(
                    "unknown OS type {os_type:?} for user script, expected one of {}",
                    USER_SCRIPT_OS_TYPES.join(", ")
                )));
            }
            scripts.global.insert(os_type, read_script(Path::new(&path))?);
        }
        for arg in instance_args {
            let (instance, path) = parse_script_arg(arg.as_ref())?;
            scripts
                .instances
                .insert(instance, read_script(Path::new(&path))?);
        }
        Ok(scripts)
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.instances.is_empty()
    }
}

/// Split `key=path` on the first `=`; script paths may contain `=`.
fn parse_script_arg(s: &str) -> Result<(String, String)> {
    let (key, path) = s
        .split_once('=')
        .ok_or_else(|| Error::InvalidArgument(format!("expected key=path, got {s:?}")))?;
    let (key, path) = (key.trim(), path.trim());
    if key.is_empty() || path.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "expected key=path with both sides set, got {s:?}"
        )));
    }
    Ok((key.to_owned(), path.to_owned()))
}

fn read_script(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_owned(),
        source,
    })
}

/// JSON options may be given inline or as a path to a file holding them.
pub fn load_json_option(raw: Option<&str>, file: Option<&Path>) -> Result<Option<Value>> {
    match (raw, file) {
        (Some(_), Some(_)) => Err(Error::InvalidArgument(
            "give the option either inline or as a file, not both".into(),
        )),
        (Some(raw), None) => serde_json::from_str(raw)
            .map(Some)
            .map_err(|e| Error::InvalidArgument(format!("invalid JSON {raw:?}: {e}"))),
        (None, Some(path)) => {
            let data = std::fs::read_to_string(path).map_err(|source| Error::Io {
                path: PathBuf::from(path),
                source,
            })?;
            serde_json::from_str(&data).map(Some).map_err(|e| {
                Error::InvalidArgument(format!("invalid JSON in {}: {e}", path.display()))
            })
        }
        (None, None) => Ok(None),
    }
}
