// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Declarative field configuration for every entity type.
//!
//! One generic form renderer and one generic detail view consume these
//! tables; nothing else in the workspace knows an entity's fields.

use serde::{Deserialize, Serialize};

use crate::model::{Record, Resource, is_commercial_property_type};

/// A foreign collection fetched solely to populate a select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RefSource {
    Imoveis,
    Locadores,
    Locatarios,
    Contratos,
}

impl RefSource {
    pub const fn resource(self) -> Resource {
        match self {
            Self::Imoveis => Resource::Imoveis,
            Self::Locadores => Resource::Locadores,
            Self::Locatarios => Resource::Locatarios,
            Self::Contratos => Resource::Contratos,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Imoveis => "imóveis",
            Self::Locadores => "locadores",
            Self::Locatarios => "locatários",
            Self::Contratos => "contratos",
        }
    }

    /// How one option of this collection is presented in a select.
    pub fn option_label(self, record: &Record) -> String {
        match self {
            Self::Imoveis => record.text("endereco"),
            Self::Locadores | Self::Locatarios => record.text("nome"),
            Self::Contratos => {
                let id = record.id.map(|id| id.to_string()).unwrap_or_default();
                format!("Contrato #{id} ({})", record.text("imovel"))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number { step: Option<&'static str> },
    Date,
    Select { options: &'static [&'static str] },
    Reference { source: RefSource },
    TextArea,
}

/// Grouping hint for two-column form layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSpan {
    One,
    Two,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: &'static str,
    pub span: FieldSpan,
}

impl FieldSpec {
    const fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: false,
            default: "",
            span: FieldSpan::One,
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn span2(mut self) -> Self {
        self.span = FieldSpan::Two;
        self
    }

    const fn preset(mut self, default: &'static str) -> Self {
        self.default = default;
        self
    }
}

const MONEY: FieldKind = FieldKind::Number { step: Some("0.01") };
const COUNT: FieldKind = FieldKind::Number { step: None };

pub const PROPERTY_TYPE_OPTIONS: &[&str] = &["Casa", "Apartamento", "Sala Comercial"];
pub const PROPERTY_STATUS_OPTIONS: &[&str] = &["Disponível", "Alugado", "Vendido"];
pub const PERSON_NATURE_OPTIONS: &[&str] = &["Física", "Jurídica"];
pub const GUARANTEE_OPTIONS: &[&str] = &["Caução", "Fiador", "Seguro Fiança"];
pub const CONTRACT_STATUS_OPTIONS: &[&str] = &["Ativo", "Encerrado", "Rescindido", "Renovado"];
pub const PAYMENT_METHOD_OPTIONS: &[&str] = &["PIX", "Boleto", "Transferência Bancária"];
pub const PAYMENT_STATUS_OPTIONS: &[&str] = &["Pendente", "Pago", "Em Atraso"];
pub const MAINTENANCE_STATUS_OPTIONS: &[&str] =
    &["Pendente", "Em Andamento", "Concluído", "Cancelado"];

const IMOVEL_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("endereco", "Endereço Completo", FieldKind::Text)
        .required()
        .span2(),
    FieldSpec::new(
        "tipo_imovel",
        "Tipo de Imóvel",
        FieldKind::Select {
            options: PROPERTY_TYPE_OPTIONS,
        },
    )
    .required()
    .preset("Apartamento"),
    FieldSpec::new(
        "status_imovel",
        "Status",
        FieldKind::Select {
            options: PROPERTY_STATUS_OPTIONS,
        },
    )
    .required()
    .preset("Disponível"),
    FieldSpec::new("descricao", "Descrição", FieldKind::TextArea).span2(),
    FieldSpec::new("valor_aluguel", "Valor do Aluguel", MONEY).required(),
    FieldSpec::new("valor_liquido_aluguel", "Valor Líquido Aluguel", MONEY),
    FieldSpec::new("valor_venda", "Valor de Venda", MONEY),
    FieldSpec::new("imposto_venda", "Imposto sobre Venda", MONEY),
    FieldSpec::new("valor_liquido_venda", "Valor Líquido da Venda", MONEY),
    FieldSpec::new("condominio_valor", "Valor do Condomínio", MONEY),
    FieldSpec::new("iptu_valor", "Valor do IPTU", MONEY),
    FieldSpec::new("area_util", "Área Útil (m²)", COUNT).required(),
    FieldSpec::new("area_total", "Área Total (m²)", COUNT),
    FieldSpec::new("andar", "Andar", COUNT),
    FieldSpec::new("numero_quartos", "Quartos", COUNT),
    FieldSpec::new("vagas_garagem", "Vagas de Garagem", COUNT),
    FieldSpec::new("numero_banheiros", "Banheiros", COUNT),
    FieldSpec::new("codigo_energia", "Código de Energia", FieldKind::Text),
    FieldSpec::new("codigo_agua", "Código de Água", FieldKind::Text),
    FieldSpec::new(
        "administradora_condominio",
        "Administradora do Condomínio",
        FieldKind::Text,
    ),
    FieldSpec::new("data_aquisicao", "Data de Aquisição", FieldKind::Date),
    FieldSpec::new("valor_aquisicao", "Valor de Aquisição", MONEY),
    FieldSpec::new("data_venda", "Data da Venda", FieldKind::Date),
    FieldSpec::new("seguro_vencimento", "Vencimento do Seguro", FieldKind::Date),
    FieldSpec::new("seguro_corretora", "Corretora do Seguro", FieldKind::Text),
    FieldSpec::new("seguro_seguradora", "Seguradora", FieldKind::Text),
    FieldSpec::new("seguro_valor", "Valor do Seguro", MONEY),
    // Visible only for commercial property types; see `field_visible`.
    FieldSpec::new("numero_avcb", "Número do AVCB", FieldKind::Text),
    FieldSpec::new("vencimento_avcb", "Vencimento do AVCB", FieldKind::Date),
];

const PESSOA_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(
        "tipo_pessoa",
        "Natureza",
        FieldKind::Select {
            options: PERSON_NATURE_OPTIONS,
        },
    )
    .preset("Física"),
    FieldSpec::new("nome", "Nome Completo / Razão Social", FieldKind::Text)
        .required()
        .span2(),
    FieldSpec::new("cpf_cnpj", "CPF", FieldKind::Text).required(),
    FieldSpec::new("profissao", "Profissão", FieldKind::Text),
    FieldSpec::new("email", "E-mail", FieldKind::Text).required(),
    FieldSpec::new("telefone", "Telefone", FieldKind::Text).required(),
    FieldSpec::new("endereco", "Endereço", FieldKind::Text).span2(),
    FieldSpec::new("dados_bancarios", "Dados Bancários", FieldKind::TextArea).span2(),
];

const CONTRATO_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(
        "imovel_id",
        "Imóvel",
        FieldKind::Reference {
            source: RefSource::Imoveis,
        },
    )
    .required()
    .span2(),
    FieldSpec::new(
        "locador_id",
        "Locador (Proprietário)",
        FieldKind::Reference {
            source: RefSource::Locadores,
        },
    )
    .required(),
    FieldSpec::new(
        "locatario_id",
        "Locatário (Inquilino)",
        FieldKind::Reference {
            source: RefSource::Locatarios,
        },
    )
    .required(),
    FieldSpec::new("data_inicio", "Data de Início", FieldKind::Date).required(),
    FieldSpec::new("data_fim", "Data de Fim", FieldKind::Date).required(),
    FieldSpec::new("data_assinatura", "Data da Assinatura", FieldKind::Date).required(),
    FieldSpec::new("data_vencimento_pagamento", "Dia do Vencimento", COUNT).required(),
    FieldSpec::new("valor_aluguel", "Valor Aluguel (R$)", MONEY).required(),
    FieldSpec::new("valor_deposito", "Valor Depósito (R$)", MONEY),
    FieldSpec::new("multa_rescisoria", "Multa Rescisória (R$)", MONEY),
    FieldSpec::new(
        "tipo_garantia",
        "Tipo de Garantia",
        FieldKind::Select {
            options: GUARANTEE_OPTIONS,
        },
    )
    .preset("Caução"),
    FieldSpec::new(
        "status_contrato",
        "Status do Contrato",
        FieldKind::Select {
            options: CONTRACT_STATUS_OPTIONS,
        },
    )
    .preset("Ativo"),
    FieldSpec::new(
        "clausulas_especificas",
        "Cláusulas Específicas",
        FieldKind::TextArea,
    )
    .span2(),
];

const PAGAMENTO_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(
        "contrato_id",
        "Contrato",
        FieldKind::Reference {
            source: RefSource::Contratos,
        },
    )
    .required(),
    FieldSpec::new("data_pagamento", "Data do Pagamento", FieldKind::Date).required(),
    FieldSpec::new("valor_pago", "Valor Pago", MONEY).required(),
    FieldSpec::new("multa_juros", "Multa / Juros", MONEY),
    FieldSpec::new(
        "forma_pagamento",
        "Forma de Pagamento",
        FieldKind::Select {
            options: PAYMENT_METHOD_OPTIONS,
        },
    )
    .preset("PIX"),
    FieldSpec::new(
        "status_pagamento",
        "Status do Pagamento",
        FieldKind::Select {
            options: PAYMENT_STATUS_OPTIONS,
        },
    )
    .preset("Pendente"),
    FieldSpec::new(
        "comprovante_pagamento",
        "URL do Comprovante (Opcional)",
        FieldKind::Text,
    )
    .span2(),
];

const MANUTENCAO_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(
        "imovel_id",
        "Imóvel",
        FieldKind::Reference {
            source: RefSource::Imoveis,
        },
    )
    .required()
    .span2(),
    FieldSpec::new("descricao", "Descrição do Problema", FieldKind::TextArea)
        .required()
        .span2(),
    FieldSpec::new("data_solicitacao", "Data da Solicitação", FieldKind::Date).required(),
    FieldSpec::new(
        "status_manutencao",
        "Status da Manutenção",
        FieldKind::Select {
            options: MAINTENANCE_STATUS_OPTIONS,
        },
    )
    .preset("Pendente"),
    FieldSpec::new(
        "responsavel_manutencao",
        "Responsável (Empresa/Pessoa)",
        FieldKind::Text,
    ),
    FieldSpec::new("custo_manutencao", "Custo da Manutenção", MONEY),
    FieldSpec::new("data_conclusao", "Data de Conclusão", FieldKind::Date),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormKind {
    Imovel,
    Pessoa,
    Contrato,
    Pagamento,
    Manutencao,
}

impl FormKind {
    pub const fn fields(self) -> &'static [FieldSpec] {
        match self {
            Self::Imovel => IMOVEL_FIELDS,
            Self::Pessoa => PESSOA_FIELDS,
            Self::Contrato => CONTRATO_FIELDS,
            Self::Pagamento => PAGAMENTO_FIELDS,
            Self::Manutencao => MANUTENCAO_FIELDS,
        }
    }

    pub fn field(self, key: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|spec| spec.key == key)
    }

    /// Foreign collections this form needs, in field order, deduplicated.
    pub fn reference_sources(self) -> Vec<RefSource> {
        let mut sources = Vec::new();
        for spec in self.fields() {
            if let FieldKind::Reference { source } = spec.kind
                && !sources.contains(&source)
            {
                sources.push(source);
            }
        }
        sources
    }
}

pub const CERTIFICATE_FIELD_KEYS: &[&str] = &["numero_avcb", "vencimento_avcb"];

pub fn is_certificate_field(key: &str) -> bool {
    CERTIFICATE_FIELD_KEYS.contains(&key)
}

/// The single conditional-visibility predicate, shared by the detail view
/// and the form renderer. Evaluated against the current (unsubmitted)
/// property type, so toggling the type in a create form toggles the
/// certificate fields immediately.
pub fn field_visible(form: FormKind, key: &str, tipo_imovel: Option<&str>) -> bool {
    if form != FormKind::Imovel || !is_certificate_field(key) {
        return true;
    }
    tipo_imovel.is_some_and(is_commercial_property_type)
}

/// The cpf_cnpj label tracks the person's nature select.
pub fn cpf_cnpj_label(tipo_pessoa: &str) -> &'static str {
    if tipo_pessoa == "Jurídica" { "CNPJ" } else { "CPF" }
}
