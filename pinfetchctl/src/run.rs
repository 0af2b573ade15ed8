//! The extraction pipeline and the discovery actions.
//!

use std::fs;
use std::path::Path;

use eyre::{eyre, Result};
use tabled::Table;
use tracing::info;

use pinfetch_sources::{probe_body, Auth, Pinterest, SourceError};

use crate::{
    check_headers, combine, normalize_header, staging_dir, submit_all, table_dir,
    wait_for_reports, write_manifest, Configuration, Manifest, ACCOUNT_ID_COLUMN,
};

/// Build the one client used for the whole run.
///
pub fn build_client(auth: &Auth, api_url: Option<&str>) -> Result<Pinterest, SourceError> {
    match api_url {
        Some(url) => Pinterest::with_base_url(auth, url),
        None => Pinterest::new(auth),
    }
}

/// Main execution code
///
/// 1. Submit one report request per account or per template reference
/// 2. Wait until all reports settled, fetching the finished ones
/// 3. Check schema consistency across the staged reports
/// 4. Combine them into the resulting table, one row prefix per account
/// 5. Write the table manifest
///
#[tracing::instrument(skip(cfg))]
pub fn run_extraction(datadir: &Path, cfg: &Configuration) -> Result<()> {
    let client = build_client(cfg.auth(), cfg.api_url.as_deref())?;

    let mut jobs = submit_all(&client, cfg)?;

    let staging = staging_dir(datadir);
    fs::create_dir_all(&staging)?;
    wait_for_reports(&client, &mut jobs, &staging, &cfg.poll)?;

    let (mut keys, mut columns) = check_headers(&staging, &jobs)?;
    keys.insert(0, ACCOUNT_ID_COLUMN.to_string());
    columns.insert(0, ACCOUNT_ID_COLUMN.to_string());
    let keys = normalize_header(&keys);
    let columns = normalize_header(&columns);

    let out_dir = table_dir(datadir, &cfg.destination.table_name);
    fs::create_dir_all(&out_dir)?;
    let rows = combine(&staging, &out_dir, &jobs)?;

    write_manifest(
        datadir,
        &cfg.destination.table_name,
        &Manifest {
            columns,
            primary_key: keys,
            incremental: cfg.destination.incremental_loading,
        },
    )?;

    info!("Extraction finished, {} rows written.", rows);
    Ok(())
}

/// Print every accessible ad account.
///
pub fn list_accounts(client: &Pinterest) -> Result<()> {
    let accounts = client.list_accounts()?;
    println!("{}", Table::new(&accounts));
    Ok(())
}

/// Print the stored templates of every configured account.
///
pub fn list_templates(client: &Pinterest, accounts: &[String]) -> Result<()> {
    let mut all = vec![];
    for account_id in accounts {
        all.extend(client.list_templates(account_id)?);
    }
    println!("{}", Table::new(&all));
    Ok(())
}

/// Print all valid report columns.
///
/// The API does not provide that list, so we submit a report request with an
/// invalid column and read the valid set out of the rejection.
///
pub fn list_columns(client: &Pinterest, accounts: &[String]) -> Result<()> {
    let account_id = match accounts.first() {
        Some(id) => id.clone(),
        None => client
            .list_accounts()?
            .first()
            .map(|a| a.id.clone())
            .ok_or_else(|| eyre!("It was not possible to find a usable account_id"))?,
    };

    match client.create_report(&account_id, &probe_body()) {
        Err(SourceError::InvalidColumns { columns }) => {
            columns.iter().for_each(|c| println!("{c}"));
            Ok(())
        }
        Err(e) => Err(e.into()),
        Ok(_) => Err(eyre!("Failed to generate a list of columns")),
    }
}
