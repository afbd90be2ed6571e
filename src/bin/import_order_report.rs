// Small ops utility: import one or more SAP order reports without starting the HTTP server.
//
// Usage:
//   cargo run --bin import_order_report -- <db_path> <file.xlsx> [more files...]
//
// Files are imported concurrently against one store; each summary is printed as a JSON line.

use anyhow::{bail, Context, Result};
use sap_order_import::app::AppState;
use sap_order_import::db::{ensure_schema, open_sqlite_connection};
use sap_order_import::config::LogFormat;
use sap_order_import::logging;
use std::path::Path;
use std::sync::{Arc, Mutex};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init(LogFormat::Text);

    let mut args = std::env::args().skip(1);
    let db_path = match args.next() {
        Some(p) => p,
        None => bail!("usage: import_order_report <db_path> <file.xlsx> [more files...]"),
    };
    let files: Vec<String> = args.collect();
    if files.is_empty() {
        bail!("no input files given");
    }

    let conn = open_sqlite_connection(&db_path)
        .with_context(|| format!("cannot open database {}", db_path))?;
    ensure_schema(&conn)?;
    let state = AppState::with_connection(Arc::new(Mutex::new(conn)));

    let imports = files.into_iter().map(|path| {
        let api = Arc::clone(&state.import_api);
        async move {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("cannot read {}", path))?;
            let file_name = Path::new(&path)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.clone());
            let result = api.import_order_report(file_name, bytes).await;
            anyhow::Ok((path, result))
        }
    });

    let mut failed = 0usize;
    for joined in futures::future::join_all(imports).await {
        let (path, result) = joined?;
        match result {
            Ok(response) => {
                println!(
                    "{}",
                    serde_json::json!({ "file": path, "result": response })
                );
            }
            Err(err) => {
                failed += 1;
                println!(
                    "{}",
                    serde_json::json!({
                        "file": path,
                        "status": "error",
                        "httpStatus": err.status_code().as_u16(),
                        "message": err.to_string(),
                    })
                );
            }
        }
    }

    if failed > 0 {
        bail!("{} file(s) could not be imported", failed);
    }
    Ok(())
}
