//! The persisted JSON shape consumed by downstream collaborators.
//!
//! Field names and nesting here are a compatibility contract with the
//! chatbot and reporting tools; the structs mirror the JSON one-to-one,
//! Portuguese names included, and must not be reshaped.

use serde::{Deserialize, Serialize};

use crate::models::receipt::{Receipt, ReceiptType};
use crate::receipt::rules::{format_brl, looks_like_cnpj};

/// One canonical receipt on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptRecord {
    pub id_transacao: String,
    pub resumo: Resumo,
    pub participantes: Participantes,
    pub detalhes_operacao: DetalhesOperacao,
    pub metadados_sistema: MetadadosSistema,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resumo {
    pub tipo: String,
    pub valor: String,
    pub valor_numerico: f64,
    pub data_completa: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participantes {
    pub origem: ParteOrigem,
    pub destino: ParteDestino,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParteOrigem {
    pub nome_completo: String,
    pub documento: String,
    pub banco: String,
    pub tipo_pessoa: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParteDestino {
    pub nome_completo: String,
    pub documento: String,
    pub banco: String,
    pub chave_pix: String,
    pub tipo_pessoa: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetalhesOperacao {
    pub codigo_transacao: String,
    pub codigo_autenticacao: String,
    pub descricao_operacao: String,
    pub tipo_operacao: String,
    pub canal_utilizado: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadadosSistema {
    pub arquivo_fonte: String,
    pub data_processamento: String,
    pub nivel_confianca: String,
    pub validacoes: Validacoes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Validacoes {
    pub padroes_reconhecidos: Vec<String>,
    pub alertas: Vec<String>,
    pub score_confianca: f64,
}

/// Person/company marker from the document shape. Masked and 11-digit
/// ids are persons; only a 14-digit id marks a company.
fn tipo_pessoa(document: &str) -> &'static str {
    if looks_like_cnpj(document) { "PJ" } else { "PF" }
}

fn tipo_operacao(kind: ReceiptType) -> &'static str {
    match kind {
        ReceiptType::Pix => "PIX",
        ReceiptType::Boleto => "Boleto",
        ReceiptType::Transfer | ReceiptType::Generic => "Transferência",
    }
}

impl From<&Receipt> for ReceiptRecord {
    fn from(receipt: &Receipt) -> Self {
        ReceiptRecord {
            id_transacao: receipt.id.clone(),
            resumo: Resumo {
                tipo: receipt.kind.as_str().to_string(),
                valor: format_brl(receipt.amount.value()),
                valor_numerico: receipt.amount.to_f64(),
                data_completa: receipt.date_time_display(),
                status: if receipt.status.is_empty() {
                    "Processado".to_string()
                } else {
                    receipt.status.clone()
                },
            },
            participantes: Participantes {
                origem: ParteOrigem {
                    nome_completo: receipt.payer.name.clone(),
                    documento: receipt.payer.document.clone(),
                    banco: receipt.payer.institution.clone(),
                    tipo_pessoa: tipo_pessoa(&receipt.payer.document).to_string(),
                },
                destino: ParteDestino {
                    nome_completo: receipt.payee.name.clone(),
                    documento: receipt.payee.document.clone(),
                    banco: receipt.payee.institution.clone(),
                    chave_pix: receipt.payee.pix_key.clone(),
                    tipo_pessoa: tipo_pessoa(&receipt.payee.document).to_string(),
                },
            },
            detalhes_operacao: DetalhesOperacao {
                codigo_transacao: receipt.transaction_id.clone(),
                codigo_autenticacao: receipt.auth_code.clone(),
                descricao_operacao: receipt.description.clone(),
                tipo_operacao: tipo_operacao(receipt.kind).to_string(),
                canal_utilizado: receipt.layout.display_name().to_string(),
            },
            metadados_sistema: MetadadosSistema {
                arquivo_fonte: receipt.source.file.clone(),
                data_processamento: receipt.source.processed_at.to_rfc3339(),
                nivel_confianca: if receipt.amount.is_zero() {
                    "baixa".to_string()
                } else {
                    "alta".to_string()
                },
                validacoes: Validacoes {
                    padroes_reconhecidos: receipt.matched_signals.clone(),
                    alertas: receipt.warnings.clone(),
                    score_confianca: receipt.confidence as f64,
                },
            },
        }
    }
}
