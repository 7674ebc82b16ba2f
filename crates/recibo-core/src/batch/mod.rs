//! Batch reduction: the two persisted artifacts.
//!
//! Documents in a batch are processed independently, in any order and
//! possibly concurrently. This module is the single-threaded reduction
//! that runs afterwards, over the final, complete set of outcomes: it
//! builds the flat extraction report and the chatbot export with its
//! lookup indices. The field names and nesting of both artifacts are a
//! compatibility contract with downstream consumers.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::models::wire::ReceiptRecord;
use crate::receipt::extractor::RawFieldMap;
use crate::receipt::pipeline::ExtractionOutcome;

/// Flat extraction report, one entry per input document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredReport {
    pub metadata: ReportMetadata,
    pub comprovantes: Vec<DocumentEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub total_processados: usize,
    pub com_sucesso: usize,
    pub com_erro: usize,
    pub data_processamento: String,
}

/// One document's raw extraction. Error entries carry `erro` and no
/// extracted fields, so a caller can report per-document failure without
/// losing the rest of the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub arquivo: String,
    pub processado_em: String,
    pub layout_detectado: String,
    pub tipo_documento: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub erro: Option<String>,
    pub raw_text: String,
    pub cleaned_text: String,
    #[serde(flatten)]
    pub campos: RawFieldMap,
}

/// Chatbot export: the wire receipts plus derived lookup indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatbotExport {
    pub metadata: ChatbotMetadata,
    pub transacoes: Vec<ReceiptRecord>,
    pub indices_busca: SearchIndices,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatbotMetadata {
    pub total_transacoes: usize,
    pub tipos_encontrados: Vec<String>,
    pub bancos_detectados: Vec<String>,
    pub valor_total_processado: f64,
    pub periodo_cobertura: PeriodoCobertura,
    pub processado_em: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodoCobertura {
    pub mais_antigo: String,
    pub mais_recente: String,
}

/// Lookup indices: each value an ordered list of receipt ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchIndices {
    pub por_destinatario: BTreeMap<String, Vec<String>>,
    pub por_valor: BTreeMap<String, Vec<String>>,
    pub por_tipo: BTreeMap<String, Vec<String>>,
    pub por_banco: BTreeMap<String, Vec<String>>,
}

/// Ten-unit amount bucket, e.g. 33.00 → `"30-39"`.
fn amount_bucket(value: f64) -> String {
    let base = (value / 10.0).floor() as i64 * 10;
    format!("{}-{}", base, base + 9)
}

impl StructuredReport {
    /// Build the flat report from a completed batch.
    pub fn from_outcomes(outcomes: &[ExtractionOutcome]) -> Self {
        let comprovantes: Vec<DocumentEntry> = outcomes
            .iter()
            .map(|outcome| DocumentEntry {
                arquivo: outcome.receipt.source.file.clone(),
                processado_em: outcome.receipt.source.processed_at.to_rfc3339(),
                layout_detectado: outcome.receipt.layout.code().to_string(),
                tipo_documento: outcome.receipt.kind.as_str().to_string(),
                erro: outcome.receipt.error.clone(),
                raw_text: outcome.raw_text.clone(),
                cleaned_text: outcome.corrected_text.clone(),
                campos: outcome.fields.clone(),
            })
            .collect();

        let com_erro = comprovantes.iter().filter(|c| c.erro.is_some()).count();

        StructuredReport {
            metadata: ReportMetadata {
                total_processados: comprovantes.len(),
                com_sucesso: comprovantes.len() - com_erro,
                com_erro,
                data_processamento: Utc::now().to_rfc3339(),
            },
            comprovantes,
        }
    }
}

impl ChatbotExport {
    /// Build the chatbot export from a completed batch. Error receipts
    /// are excluded; they appear only in the flat report.
    pub fn from_outcomes(outcomes: &[ExtractionOutcome]) -> Self {
        let transacoes: Vec<ReceiptRecord> = outcomes
            .iter()
            .filter(|o| !o.receipt.is_error())
            .map(|o| ReceiptRecord::from(&o.receipt))
            .collect();

        let mut indices = SearchIndices::default();
        for record in &transacoes {
            let id = &record.id_transacao;

            let payee = &record.participantes.destino.nome_completo;
            if !payee.is_empty() {
                push_index(&mut indices.por_destinatario, payee, id);
            }

            if record.resumo.valor_numerico > 0.0 {
                let bucket = amount_bucket(record.resumo.valor_numerico);
                push_index(&mut indices.por_valor, &bucket, id);
            }

            push_index(&mut indices.por_tipo, &record.resumo.tipo, id);
            push_index(
                &mut indices.por_banco,
                &record.detalhes_operacao.canal_utilizado,
                id,
            );
        }

        let tipos: BTreeSet<String> =
            transacoes.iter().map(|t| t.resumo.tipo.clone()).collect();
        let bancos: BTreeSet<String> = transacoes
            .iter()
            .map(|t| t.detalhes_operacao.canal_utilizado.clone())
            .collect();

        let datas: Vec<&String> = transacoes
            .iter()
            .map(|t| &t.resumo.data_completa)
            .filter(|d| !d.is_empty())
            .collect();

        ChatbotExport {
            metadata: ChatbotMetadata {
                total_transacoes: transacoes.len(),
                tipos_encontrados: tipos.into_iter().collect(),
                bancos_detectados: bancos.into_iter().collect(),
                valor_total_processado: transacoes
                    .iter()
                    .map(|t| t.resumo.valor_numerico)
                    .sum(),
                periodo_cobertura: PeriodoCobertura {
                    mais_antigo: datas.iter().min().map(|s| s.to_string()).unwrap_or_default(),
                    mais_recente: datas.iter().max().map(|s| s.to_string()).unwrap_or_default(),
                },
                processado_em: Utc::now().to_rfc3339(),
            },
            transacoes,
            indices_busca: indices,
        }
    }
}

fn push_index(index: &mut BTreeMap<String, Vec<String>>, key: &str, id: &str) {
    index
        .entry(key.to_string())
        .or_default()
        .push(id.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::pipeline::Pipeline;
    use pretty_assertions::assert_eq;

    const WILL_BANK_TEXT: &str = "\
Will Bank
R$ 33,00
Para Ana Cleuma Sousa Dos Santos
CPF/CNPJ ***.120.983-**
20/05/2025
17:51:22";

    const NUBANK_TEXT: &str = "\
Comprovante de transferência
20 MAI 2025 - 17:52:04
Valor R$ 17,00
Origem
Nome Sheila Fernandes Da Silva
Instituição NU PAGAMENTOS - IP
Destino
Nome Ana Cleuma Sousa Dos Santos
Instituição NU PAGAMENTOS - IP
Identificador abc123def";

    fn outcomes() -> Vec<ExtractionOutcome> {
        let pipeline = Pipeline::new();
        vec![
            pipeline.run(WILL_BANK_TEXT, Some("antonio.jpg")),
            pipeline.run(NUBANK_TEXT, Some("sheila.jpg")),
            pipeline.run("", Some("vazio.jpg")),
        ]
    }

    #[test]
    fn test_flat_report_counts_errors() {
        let report = StructuredReport::from_outcomes(&outcomes());

        assert_eq!(report.metadata.total_processados, 3);
        assert_eq!(report.metadata.com_sucesso, 2);
        assert_eq!(report.metadata.com_erro, 1);

        let error_entry = report
            .comprovantes
            .iter()
            .find(|c| c.arquivo == "vazio.jpg")
            .unwrap();
        assert!(error_entry.erro.is_some());
        assert!(error_entry.campos.is_empty());
    }

    #[test]
    fn test_flat_report_fields_are_inline() {
        let report = StructuredReport::from_outcomes(&outcomes());
        let json = serde_json::to_value(&report).unwrap();

        let first = &json["comprovantes"][0];
        // Extracted fields sit at the entry's top level, next to the
        // bookkeeping keys.
        assert_eq!(first["arquivo"], "antonio.jpg");
        assert_eq!(first["layout_detectado"], "will_bank");
        assert_eq!(first["valor"], "33,00");
        assert_eq!(first["destino_nome"], "Ana Cleuma Sousa Dos Santos");
    }

    #[test]
    fn test_chatbot_export_excludes_errors_and_indexes() {
        let export = ChatbotExport::from_outcomes(&outcomes());

        assert_eq!(export.metadata.total_transacoes, 2);
        assert_eq!(export.transacoes.len(), 2);

        let by_payee = &export.indices_busca.por_destinatario["Ana Cleuma Sousa Dos Santos"];
        assert_eq!(by_payee.len(), 2);

        assert!(export.indices_busca.por_valor.contains_key("30-39"));
        assert!(export.indices_busca.por_valor.contains_key("10-19"));
        assert!(export.indices_busca.por_tipo.contains_key("pix"));
        assert!(export.indices_busca.por_banco.contains_key("Will Bank"));
    }

    #[test]
    fn test_chatbot_metadata_totals() {
        let export = ChatbotExport::from_outcomes(&outcomes());

        assert_eq!(export.metadata.valor_total_processado, 50.0);
        assert!(export.metadata.tipos_encontrados.contains(&"pix".to_string()));
        assert!(!export.metadata.periodo_cobertura.mais_antigo.is_empty());
    }

    #[test]
    fn test_amount_bucket_edges() {
        assert_eq!(amount_bucket(33.0), "30-39");
        assert_eq!(amount_bucket(9.99), "0-9");
        assert_eq!(amount_bucket(10.0), "10-19");
        assert_eq!(amount_bucket(0.01), "0-9");
    }

    #[test]
    fn test_batch_is_order_independent() {
        let pipeline = Pipeline::new();
        let forward = vec![
            pipeline.run(WILL_BANK_TEXT, Some("antonio.jpg")),
            pipeline.run(NUBANK_TEXT, Some("sheila.jpg")),
        ];
        let reversed = vec![
            pipeline.run(NUBANK_TEXT, Some("sheila.jpg")),
            pipeline.run(WILL_BANK_TEXT, Some("antonio.jpg")),
        ];

        let mut a: Vec<String> = forward
            .iter()
            .map(|o| format!("{:?}|{:?}|{}", o.receipt.layout, o.receipt.kind, o.receipt.payee.name))
            .collect();
        let mut b: Vec<String> = reversed
            .iter()
            .map(|o| format!("{:?}|{:?}|{}", o.receipt.layout, o.receipt.kind, o.receipt.payee.name))
            .collect();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }
}
