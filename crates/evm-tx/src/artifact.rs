//! Compiled contract artifacts (Hardhat layout)
//!
//! ```text
//! artifacts/
//!   contracts/PreSale.sol/PreSale.json       contractName, sourceName, abi, bytecode
//!   contracts/PreSale.sol/PreSale.dbg.json   { "buildInfo": "../../build-info/<id>.json" }
//!   build-info/<id>.json                     solcLongVersion, input (standard JSON)
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use alloy_primitives::Bytes;
use deploy_core::{ContractKind, Error, Result};
use serde::Deserialize;

/// A compiled contract ready to be deployed
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub contract_name: String,
    pub source_name: String,
    pub abi: serde_json::Value,
    pub bytecode: Bytes,
    /// Location of the artifact JSON
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    contract_name: String,
    source_name: String,
    abi: serde_json::Value,
    bytecode: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebugFile {
    build_info: String,
}

/// Compiler metadata needed to verify a deployed contract
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub solc_long_version: String,
    /// Standard JSON compiler input
    pub input: serde_json::Value,
}

impl BuildInfo {
    /// Explorer-style compiler version, e.g. `v0.8.24+commit.e11b9ed9`
    pub fn compiler_version(&self) -> String {
        format!("v{}", self.solc_long_version)
    }
}

impl ContractArtifact {
    /// `sourceName:contractName`, as explorers expect it
    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }

    /// Number of constructor parameters declared in the ABI
    pub fn constructor_arity(&self) -> usize {
        self.abi
            .as_array()
            .and_then(|entries| {
                entries
                    .iter()
                    .find(|e| e["type"].as_str() == Some("constructor"))
            })
            .and_then(|ctor| ctor["inputs"].as_array())
            .map(|inputs| inputs.len())
            .unwrap_or(0)
    }
}

/// Reads artifacts from a Hardhat `artifacts/` directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Load the artifact for a contract kind
    pub fn load(&self, kind: ContractKind) -> Result<ContractArtifact> {
        self.load_by_name(kind.contract_name())
    }

    /// Load the artifact whose contract name is `name`
    pub fn load_by_name(&self, name: &str) -> Result<ContractArtifact> {
        let file_name = format!("{}.json", name);
        let mut matches = Vec::new();
        find_files(&self.root.join("contracts"), &file_name, &mut matches);

        let path = match matches.len() {
            0 => {
                return Err(artifact_error(
                    name,
                    format!("{} not found under {}", file_name, self.root.display()),
                ))
            }
            1 => matches.remove(0),
            n => {
                return Err(artifact_error(
                    name,
                    format!("{} artifacts named {}; names must be unique", n, file_name),
                ))
            }
        };

        let raw: RawArtifact = read_json(name, &path)?;
        let bytecode = decode_bytecode(name, &raw.bytecode)?;

        Ok(ContractArtifact {
            contract_name: raw.contract_name,
            source_name: raw.source_name,
            abi: raw.abi,
            bytecode,
            path,
        })
    }

    /// Load the build info referenced by the artifact's `.dbg.json` sibling
    pub fn build_info(&self, artifact: &ContractArtifact) -> Result<BuildInfo> {
        let name = &artifact.contract_name;
        let dir = artifact
            .path
            .parent()
            .ok_or_else(|| artifact_error(name, "artifact path has no parent directory"))?;
        let debug: DebugFile = read_json(name, &dir.join(format!("{}.dbg.json", name)))?;
        read_json(name, &dir.join(debug.build_info))
    }
}

fn find_files(dir: &Path, file_name: &str, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            find_files(&path, file_name, out);
        } else if path.file_name().and_then(|n| n.to_str()) == Some(file_name) {
            out.push(path);
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(contract: &str, path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .map_err(|e| artifact_error(contract, format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&text)
        .map_err(|e| artifact_error(contract, format!("{}: {}", path.display(), e)))
}

fn decode_bytecode(contract: &str, bytecode: &str) -> Result<Bytes> {
    let hex_str = bytecode.trim().trim_start_matches("0x");
    if hex_str.is_empty() {
        return Err(artifact_error(
            contract,
            "empty bytecode (abstract contract or interface)",
        ));
    }
    if hex_str.contains("__$") {
        return Err(artifact_error(contract, "bytecode has unlinked libraries"));
    }
    hex::decode(hex_str)
        .map(Bytes::from)
        .map_err(|e| artifact_error(contract, format!("invalid bytecode hex: {}", e)))
}

fn artifact_error(contract: &str, reason: impl Into<String>) -> Error {
    Error::Artifact {
        contract: contract.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn sample_store() -> (tempfile::TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            &root.join("contracts/PreSale.sol/PreSale.json"),
            r#"{
                "contractName": "PreSale",
                "sourceName": "contracts/PreSale.sol",
                "abi": [
                    {"type": "constructor", "inputs": [
                        {"name": "_weth", "type": "address"},
                        {"name": "_token", "type": "address"},
                        {"name": "_router", "type": "address"},
                        {"name": "_options", "type": "tuple"}
                    ]}
                ],
                "bytecode": "0x6080604052"
            }"#,
        );
        write(
            &root.join("contracts/PreSale.sol/PreSale.dbg.json"),
            r#"{"_format": "hh-sol-dbg-1", "buildInfo": "../../build-info/abc123.json"}"#,
        );
        write(
            &root.join("build-info/abc123.json"),
            r#"{"solcLongVersion": "0.8.24+commit.e11b9ed9", "input": {"language": "Solidity", "sources": {}}}"#,
        );
        write(
            &root.join("contracts/Interface.sol/IRouter.json"),
            r#"{"contractName": "IRouter", "sourceName": "contracts/Interface.sol", "abi": [], "bytecode": "0x"}"#,
        );
        let store = ArtifactStore::new(root);
        (dir, store)
    }

    #[test]
    fn test_load_artifact() {
        let (_dir, store) = sample_store();
        let artifact = store.load(ContractKind::Presale).unwrap();
        assert_eq!(artifact.contract_name, "PreSale");
        assert_eq!(artifact.fully_qualified_name(), "contracts/PreSale.sol:PreSale");
        assert_eq!(artifact.bytecode.as_ref(), &[0x60, 0x80, 0x60, 0x40, 0x52]);
        assert_eq!(artifact.constructor_arity(), 4);
    }

    #[test]
    fn test_build_info_via_debug_file() {
        let (_dir, store) = sample_store();
        let artifact = store.load(ContractKind::Presale).unwrap();
        let info = store.build_info(&artifact).unwrap();
        assert_eq!(info.compiler_version(), "v0.8.24+commit.e11b9ed9");
        assert_eq!(info.input["language"], "Solidity");
    }

    #[test]
    fn test_missing_artifact() {
        let (_dir, store) = sample_store();
        let err = store.load(ContractKind::Token).unwrap_err();
        assert!(matches!(err, Error::Artifact { contract, .. } if contract == "KingToken"));
    }

    #[test]
    fn test_interface_has_no_bytecode() {
        let (_dir, store) = sample_store();
        let err = store.load_by_name("IRouter").unwrap_err();
        assert!(err.to_string().contains("empty bytecode"));
    }

    #[test]
    fn test_unlinked_bytecode_rejected() {
        assert!(decode_bytecode("X", "0x6080__$abc$__6040").is_err());
    }
}
