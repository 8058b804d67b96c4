//! `ufdr embed` -- run the encoder on sample inputs and show the vectors.

use anyhow::Result;
use console::style;
use serde::Serialize;

use ufdr_types::embedding::Embedding;
use ufdr_types::image::ImageInput;

use crate::state::AppState;

/// Leading components printed per row.
const HEAD_LEN: usize = 5;

#[derive(Debug, Serialize)]
struct EmbedReport {
    kind: &'static str,
    model: String,
    device: String,
    shape: [usize; 2],
    rows: Vec<RowSummary>,
}

#[derive(Debug, Serialize)]
struct RowSummary {
    input: String,
    norm: f32,
    head: Vec<f32>,
}

pub async fn embed_text(state: &AppState, texts: Vec<String>, json: bool) -> Result<()> {
    let embeddings = state.text_embedder.embed_text(texts.clone()).await?;
    let report = build_report("text", state, &texts, &embeddings);
    print_report(&report, json)
}

pub async fn embed_image(state: &AppState, sources: Vec<String>, json: bool) -> Result<()> {
    let inputs: Vec<ImageInput> = sources.iter().map(|s| ImageInput::from_str_source(s)).collect();
    let embeddings = state.image_embedder.embed_image(inputs).await?;
    let report = build_report("image", state, &sources, &embeddings);
    print_report(&report, json)
}

fn build_report(
    kind: &'static str,
    state: &AppState,
    labels: &[String],
    embeddings: &[Embedding],
) -> EmbedReport {
    let model = state.text_embedder.model();
    EmbedReport {
        kind,
        model: model.model_name().to_string(),
        device: model.device().to_string(),
        shape: [embeddings.len(), model.dimension()],
        rows: summarize(labels, embeddings),
    }
}

fn summarize(labels: &[String], embeddings: &[Embedding]) -> Vec<RowSummary> {
    labels
        .iter()
        .zip(embeddings)
        .map(|(label, embedding)| RowSummary {
            input: label.clone(),
            norm: embedding.norm(),
            head: embedding.as_slice().iter().take(HEAD_LEN).copied().collect(),
        })
        .collect()
}

fn print_report(report: &EmbedReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {} embeddings  {}",
        style("⚡").bold(),
        report.kind,
        style(format!("[{} x {}]", report.shape[0], report.shape[1])).cyan()
    );
    println!(
        "  {}",
        style(format!("{} on {}", report.model, report.device)).dim()
    );
    println!();

    for row in &report.rows {
        let head = row
            .head
            .iter()
            .map(|v| format!("{v:+.4}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!("  {}", style(&row.input).bold());
        println!("    norm: {:.6}", row.norm);
        println!("    head: [{head}, ...]");
    }
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_pairs_labels_with_rows() {
        let labels = vec!["a".to_string(), "b".to_string()];
        let embeddings = vec![
            Embedding::from_normalized(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
            Embedding::from_normalized(vec![0.0, 1.0]),
        ];

        let rows = summarize(&labels, &embeddings);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].input, "a");
        assert_eq!(rows[0].head.len(), HEAD_LEN);
        assert_eq!(rows[1].head, vec![0.0, 1.0]);
        assert!((rows[1].norm - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_embed_text_report_shape() {
        let state = crate::state::testing::unreachable_store_state();
        let texts = vec!["call log".to_string(), "chat export".to_string()];
        let embeddings = state.text_embedder.embed_text(texts.clone()).await.unwrap();

        let report = build_report("text", &state, &texts, &embeddings);
        assert_eq!(report.shape, [2, crate::state::testing::TEST_DIMENSION]);
        assert_eq!(report.device, "cpu");
        assert!(report.rows.iter().all(|r| (r.norm - 1.0).abs() < 1e-5));
    }
}
