//! `ufdr check` -- store connectivity report.

use anyhow::Result;
use console::style;
use serde::Serialize;

use ufdr_core::store::StoreClient;
use ufdr_infra::registry::ClientRegistry;

#[derive(Debug, Default, Serialize)]
struct StoreReport {
    target: String,
    connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Connect to both stores, print what was found, then close the clients.
///
/// Returns an error when either store is unreachable so the exit code
/// reflects the outcome.
pub async fn check(registry: &ClientRegistry, json: bool) -> Result<()> {
    let vector = check_vector(registry).await;
    let graph = check_graph(registry).await;
    registry.close_all().await;

    if json {
        let report = serde_json::json!({ "vector_store": vector, "graph_store": graph });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        println!("  {} Store connectivity", style("🔍").bold());
        println!();
        print_store("Chroma", &vector);
        print_store("Neo4j", &graph);
        println!();
    }

    if vector.connected && graph.connected {
        Ok(())
    } else {
        anyhow::bail!("one or more stores are unreachable")
    }
}

async fn check_vector(registry: &ClientRegistry) -> StoreReport {
    let mut report = StoreReport {
        target: registry.config().vector.base_url(),
        ..StoreReport::default()
    };

    match registry.get_vector_store_client().await {
        Ok(client) => {
            report.connected = true;
            report.session_id = Some(client.session_id().to_string());
            let collection = client.collection();
            let count = match client.count().await {
                Ok(n) => n.to_string(),
                Err(e) => format!("unknown ({e})"),
            };
            report.detail = Some(format!(
                "collection '{}' ({}), {count} records",
                collection.name, collection.id
            ));
        }
        Err(e) => report.error = Some(e.to_string()),
    }
    report
}

async fn check_graph(registry: &ClientRegistry) -> StoreReport {
    let mut report = StoreReport {
        target: registry.config().graph.uri.clone(),
        ..StoreReport::default()
    };

    match registry.get_graph_store_client().await {
        Ok(client) => {
            report.connected = true;
            report.session_id = Some(client.session_id().to_string());
            report.detail = Some("liveness query answered".to_string());
        }
        Err(e) => report.error = Some(e.to_string()),
    }
    report
}

fn print_store(name: &str, report: &StoreReport) {
    let mark = if report.connected {
        style("✓").green()
    } else {
        style("✗").red()
    };
    println!("  {mark} {} {}", style(name).bold(), style(&report.target).dim());
    if let Some(detail) = &report.detail {
        println!("      {detail}");
    }
    if let Some(error) = &report.error {
        println!("      {}", style(error).red());
    }
}
