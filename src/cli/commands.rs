//! Command handlers.
//!
//! Each handler connects the AWS-backed clients, calls one core
//! operation, and formats the result. Error-to-exit-code mapping lives in
//! `main`.

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::info;

use crate::cli::output::{self, Format, Table};
use crate::cli::Cli;
use crate::core::kms::AwsKms;
use crate::core::secrets::CredentialStore;
use crate::core::setup::TableProvisioner;
use crate::core::store::DynamoStorage;
use crate::error::Result;

fn connect(cli: &Cli) -> Result<CredentialStore<DynamoStorage, AwsKms>> {
    let storage = DynamoStorage::connect(cli.region.clone(), cli.table.clone())?;
    let keys = AwsKms::connect(cli.region.clone())?;
    Ok(CredentialStore::new(storage, keys))
}

fn table_format(cli: &Cli) -> Format {
    if cli.json {
        Format::Json
    } else if cli.csv {
        Format::Csv
    } else {
        Format::Aligned
    }
}

/// Create the credential table and wait for it to become active.
pub fn setup(cli: &Cli) -> Result<()> {
    let storage = DynamoStorage::connect(cli.region.clone(), cli.table.clone())?;
    TableProvisioner::new(&storage).setup()?;
    output::success(&format!("created table {}", cli.table));
    Ok(())
}

/// Fetch and print a secret. Bare output, for scripting.
pub fn get(cli: &Cli, name: &str, version: Option<&str>) -> Result<()> {
    let store = connect(cli)?;
    let cred = store.get(name, version)?;
    println!("{}", cred.secret);
    Ok(())
}

/// Resolve a version and store a secret.
pub fn put(cli: &Cli, name: &str, value: &str, version: u64) -> Result<()> {
    let store = connect(cli)?;
    let version = store.resolve_version(name, version)?;
    store.put(name, &cli.alias, value, &version)?;
    info!(name, %version, "stored");
    output::success(&format!("stored {} @ version {}", name, version));
    Ok(())
}

/// Store a secret read from a file.
pub fn put_file(cli: &Cli, name: &str, path: &str, version: u64) -> Result<()> {
    let value = read_secret_file(path)?;
    put(cli, name, &value, version)
}

/// Read a secret value from a file verbatim. No trimming: a trailing
/// newline in the file ends up in the stored secret.
fn read_secret_file(path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}

/// List secret names, versions, and creation dates. Never decrypts.
pub fn list(cli: &Cli, all_versions: bool) -> Result<()> {
    let store = connect(cli)?;
    let creds = store.list_secrets(all_versions)?;

    let mut table = Table::new(&["Name", "Version", "Created-At"], table_format(cli));
    for cred in &creds {
        table.row(vec![
            cred.name.clone(),
            cred.version.clone(),
            cred.created_at_date(),
        ]);
    }
    table.render()?;
    Ok(())
}

/// Fetch and decrypt every secret.
pub fn get_all(cli: &Cli, all_versions: bool) -> Result<()> {
    let store = connect(cli)?;
    let creds = store.get_all_secrets(all_versions)?;

    let mut table = Table::new(&["Name", "Secret"], table_format(cli));
    for cred in &creds {
        table.row(vec![cred.credential.name.clone(), cred.secret.clone()]);
    }
    table.render()?;
    Ok(())
}

/// Delete every version of a secret.
pub fn delete(cli: &Cli, name: &str) -> Result<()> {
    let store = connect(cli)?;
    store.delete(name)?;
    output::success(&format!("deleted {}", name));
    Ok(())
}

/// Generate shell completions on stdout.
pub fn completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "stockade", &mut std::io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::error::Error;

    #[test]
    fn test_read_secret_file_keeps_contents_verbatim() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "s3cr3t\n").unwrap();

        let value = read_secret_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(value, "s3cr3t\n");
    }

    #[test]
    fn test_read_secret_file_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent");
        assert!(matches!(
            read_secret_file(path.to_str().unwrap()),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_read_secret_file_rejects_non_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe, 0x00, 0x01]).unwrap();

        assert!(read_secret_file(file.path().to_str().unwrap()).is_err());
    }
}
