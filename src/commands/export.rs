use crate::args::ExportArgs;
use crate::commands::{api_client, Out};
use crate::error::Result;
use crate::model::{EntryKind, Transaction};
use crate::utils;
use crate::Config;
use anyhow::Context;
use serde::Serialize;

/// One CSV line. Amounts are signed here, debits negative, so the file loads straight into a
/// spreadsheet without the display formatting.
#[derive(Debug, Clone, Serialize)]
struct ExportRow {
    id: String,
    date: String,
    time: String,
    status: String,
    description: String,
    raw_text: String,
    amount: String,
    account: String,
    tags: String,
}

impl From<&Transaction> for ExportRow {
    fn from(txn: &Transaction) -> Self {
        let value = txn.amount().value();
        let amount = match txn.kind() {
            EntryKind::Credit => value,
            EntryKind::Debit => -value,
        };
        Self {
            id: txn.id().to_string(),
            date: txn.date().to_string(),
            time: txn.time.clone(),
            status: txn.status().to_string(),
            description: txn.description().to_string(),
            raw_text: txn.raw_text.clone().unwrap_or_default(),
            amount: amount.to_string(),
            account: txn.account_name.clone().unwrap_or_default(),
            tags: txn.tags.join(";"),
        }
    }
}

/// Handles the `updash export` command. Writes the normalized (uncoalesced) window as CSV to
/// the given path, or to stdout when no path was given.
pub async fn export(config: &Config, args: &ExportArgs) -> Result<Out<String>> {
    let client = api_client(config, args.credentials()).await?;
    let count = args.count().unwrap_or_else(|| config.transaction_count());
    let transactions = client
        .fetch_transactions(count)
        .await
        .context("Unable to fetch transactions from the Up API")?;

    let mut wtr = csv::Writer::from_writer(Vec::new());
    for txn in &transactions {
        wtr.serialize(ExportRow::from(txn))
            .context("Unable to serialize a transaction row")?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|err| anyhow::anyhow!("Unable to finish the CSV: {err}"))?;
    let body = String::from_utf8(bytes).context("The CSV was not valid UTF-8")?;

    match args.output() {
        Some(path) => {
            utils::write(path, &body).await?;
            Ok(Out::new(
                format!(
                    "Exported {} transactions to '{}'",
                    transactions.len(),
                    path.display()
                ),
                body,
            ))
        }
        None => {
            // Logs go to stderr, so the CSV body on stdout stays pipeable.
            print!("{body}");
            Ok(Out::new(
                format!("Exported {} transactions", transactions.len()),
                body,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{demo_credentials, TestEnv};

    #[tokio::test]
    async fn test_export_writes_a_csv_file() {
        let env = TestEnv::new().await;
        let path = env.config().root().join("export.csv");
        let args = ExportArgs::new(demo_credentials(), None, Some(path.clone()));
        let out = export(env.config(), &args).await.unwrap();
        assert!(out.message().contains("Exported 11 transactions to"));

        let body = tokio::fs::read_to_string(&path).await.unwrap();
        let mut lines = body.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,date,time,status,description,raw_text,amount,account,tags"
        );
        assert_eq!(body.lines().count(), 12);
        assert!(body.contains(
            "demo-txn-01,2025-07-18,5:01pm,SETTLED,Woolworths,WOOLWORTHS 1234 SYDNEY NS AUS,-23.50,Spending,groceries"
        ));
        assert!(body.contains(",2500.00,"));
    }

    #[tokio::test]
    async fn test_export_to_stdout_keeps_the_body() {
        let env = TestEnv::new().await;
        let args = ExportArgs::new(demo_credentials(), Some(2), None);
        let out = export(env.config(), &args).await.unwrap();
        assert_eq!(out.message(), "Exported 2 transactions");
        let body = out.structure().unwrap();
        assert_eq!(body.lines().count(), 3);
        assert!(body.contains("demo-txn-02"));
    }
}
