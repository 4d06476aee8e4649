// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use anyhow::{Result, bail};
use serde_json::{Map, Value};
use time::Date;
use time::macros::format_description;

use crate::ids::RecordId;
use crate::model::{PersonKind, PersonRow, Record, Resource};
use crate::schema::{FieldKind, FieldSpec, FormKind, field_visible};

/// Local edit state of one open form.
///
/// `values` holds the rendered fields as strings; `baseline` holds the full
/// attribute map of the record being edited so that untouched attributes
/// round-trip with their original JSON types. The person discriminator lives
/// in `person_kind` and never enters either map.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub kind: FormKind,
    pub person_kind: PersonKind,
    pub editing: Option<RecordId>,
    baseline: Map<String, Value>,
    values: BTreeMap<String, String>,
    pub field_cursor: usize,
    pub error: Option<String>,
    pub in_flight: bool,
}

impl FormState {
    pub fn create(kind: FormKind) -> Self {
        let values = kind
            .fields()
            .iter()
            .map(|spec| (spec.key.to_owned(), spec.default.to_owned()))
            .collect();
        Self {
            kind,
            person_kind: PersonKind::Locador,
            editing: None,
            baseline: Map::new(),
            values,
            field_cursor: 0,
            error: None,
            in_flight: false,
        }
    }

    pub fn edit(kind: FormKind, record: &Record) -> Self {
        let values = kind
            .fields()
            .iter()
            .map(|spec| (spec.key.to_owned(), record.text(spec.key)))
            .collect();
        Self {
            kind,
            person_kind: PersonKind::Locador,
            editing: record.id,
            baseline: record.fields.clone(),
            values,
            field_cursor: 0,
            error: None,
            in_flight: false,
        }
    }

    pub fn edit_person(person: &PersonRow) -> Self {
        Self {
            person_kind: person.kind,
            ..Self::edit(FormKind::Pessoa, &person.record)
        }
    }

    pub fn is_edit(&self) -> bool {
        self.editing.is_some()
    }

    pub fn value(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn set_value(&mut self, key: &str, value: String) {
        self.values.insert(key.to_owned(), value);
    }

    fn tipo_imovel(&self) -> Option<&str> {
        match self.kind {
            FormKind::Imovel => Some(self.value("tipo_imovel")),
            _ => None,
        }
    }

    /// Fields currently shown, re-evaluated against the unsubmitted type
    /// value on every call.
    pub fn visible_fields(&self) -> Vec<&'static FieldSpec> {
        let tipo = self.tipo_imovel().map(str::to_owned);
        self.kind
            .fields()
            .iter()
            .filter(|spec| field_visible(self.kind, spec.key, tipo.as_deref()))
            .collect()
    }

    /// The collection a submit targets; for pessoas this follows the
    /// discriminator.
    pub fn submission_resource(&self) -> Resource {
        match self.kind {
            FormKind::Imovel => Resource::Imoveis,
            FormKind::Pessoa => self.person_kind.resource(),
            FormKind::Contrato => Resource::Contratos,
            FormKind::Pagamento => Resource::Pagamentos,
            FormKind::Manutencao => Resource::Manutencoes,
        }
    }

    /// Client-side checks run before any request is issued: required fields
    /// among the visible ones, and ISO date syntax. Everything else is the
    /// server's responsibility.
    pub fn validate(&self) -> Result<()> {
        let format = format_description!("[year]-[month]-[day]");
        for spec in self.visible_fields() {
            let value = self.value(spec.key).trim().to_owned();
            if spec.required && value.is_empty() {
                bail!("{} é obrigatório -- preencha o campo e tente novamente", spec.label);
            }
            if !value.is_empty()
                && spec.kind == FieldKind::Date
                && Date::parse(&value, format).is_err()
            {
                bail!("{} deve ser uma data AAAA-MM-DD, recebido {value:?}", spec.label);
            }
        }
        Ok(())
    }

    /// Outgoing body: the edit baseline overlaid with the form fields.
    /// Empty strings become JSON `null` (the explicit absence marker, so the
    /// server can tell "cleared" from "never set"); untouched attributes keep
    /// their original JSON values.
    pub fn payload(&self) -> Map<String, Value> {
        let mut payload: Map<String, Value> = self
            .baseline
            .iter()
            .map(|(key, value)| (key.clone(), normalize_absent(value.clone())))
            .collect();

        for spec in self.kind.fields() {
            let current = self.value(spec.key);
            let seeded = match self.baseline.get(spec.key) {
                Some(value) => Some(coerce_text(value)),
                None => None,
            };
            if seeded.as_deref() == Some(current) {
                continue;
            }
            let value = if current.is_empty() {
                Value::Null
            } else {
                Value::String(current.to_owned())
            };
            payload.insert(spec.key.to_owned(), value);
        }

        payload
    }
}

fn normalize_absent(value: Value) -> Value {
    match value {
        Value::String(text) if text.is_empty() => Value::Null,
        other => other,
    }
}

fn coerce_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::FormState;
    use crate::model::{PersonKind, PersonRow, Record, Resource};
    use crate::schema::FormKind;
    use serde_json::{Value, json};

    fn record(value: Value) -> Record {
        Record::from_value(value).expect("record should parse")
    }

    #[test]
    fn create_form_seeds_schema_defaults() {
        let form = FormState::create(FormKind::Imovel);
        assert_eq!(form.value("tipo_imovel"), "Apartamento");
        assert_eq!(form.value("status_imovel"), "Disponível");
        assert_eq!(form.value("endereco"), "");
        assert!(!form.is_edit());
    }

    #[test]
    fn edit_form_seeds_from_the_record() {
        let form = FormState::edit(
            FormKind::Imovel,
            &record(json!({
                "id": 9,
                "endereco": "Rua A, 10",
                "tipo_imovel": "Casa",
                "valor_aluguel": "1500.00",
                "andar": 3,
            })),
        );
        assert!(form.is_edit());
        assert_eq!(form.value("endereco"), "Rua A, 10");
        assert_eq!(form.value("tipo_imovel"), "Casa");
        assert_eq!(form.value("andar"), "3");
    }

    #[test]
    fn create_payload_normalizes_empty_to_null_and_has_no_id() {
        let mut form = FormState::create(FormKind::Manutencao);
        form.set_value("imovel_id", "2".to_owned());
        form.set_value("descricao", "Vazamento na cozinha".to_owned());
        form.set_value("data_solicitacao", "2026-01-10".to_owned());

        let payload = form.payload();
        assert!(!payload.contains_key("id"));
        assert_eq!(payload["imovel_id"], json!("2"));
        assert_eq!(payload["descricao"], json!("Vazamento na cozinha"));
        assert_eq!(payload["custo_manutencao"], Value::Null);
        assert_eq!(payload["data_conclusao"], Value::Null);
        assert_eq!(payload["status_manutencao"], json!("Pendente"));
    }

    #[test]
    fn untouched_edit_payload_round_trips_the_record() {
        let original = json!({
            "id": 7,
            "endereco": "Rua A, 10",
            "tipo_imovel": "Apartamento",
            "status_imovel": "Disponível",
            "valor_aluguel": "1500.00",
            "valor_venda": null,
            "andar": 3,
            "descricao": "",
        });
        let form = FormState::edit(FormKind::Imovel, &record(original));

        let payload = form.payload();
        assert_eq!(payload["id"], json!(7));
        assert_eq!(payload["endereco"], json!("Rua A, 10"));
        assert_eq!(payload["valor_aluguel"], json!("1500.00"));
        // Untouched attributes keep their original JSON types.
        assert_eq!(payload["andar"], json!(3));
        // Empty strings normalize to the explicit absence marker.
        assert_eq!(payload["valor_venda"], Value::Null);
        assert_eq!(payload["descricao"], Value::Null);
    }

    #[test]
    fn edited_fields_are_submitted_as_strings() {
        let mut form = FormState::edit(
            FormKind::Imovel,
            &record(json!({"id": 7, "andar": 3, "endereco": "Rua A, 10"})),
        );
        form.set_value("andar", "5".to_owned());
        form.set_value("endereco", String::new());

        let payload = form.payload();
        assert_eq!(payload["andar"], json!("5"));
        assert_eq!(payload["endereco"], Value::Null);
    }

    #[test]
    fn certificate_fields_toggle_with_the_type_value() {
        let mut form = FormState::create(FormKind::Imovel);
        let visible = |form: &FormState, key: &str| {
            form.visible_fields().iter().any(|spec| spec.key == key)
        };
        assert!(!visible(&form, "numero_avcb"));
        assert!(!visible(&form, "vencimento_avcb"));

        form.set_value("tipo_imovel", "Sala Comercial".to_owned());
        assert!(visible(&form, "numero_avcb"));
        assert!(visible(&form, "vencimento_avcb"));

        form.set_value("tipo_imovel", "Casa".to_owned());
        assert!(!visible(&form, "numero_avcb"));
    }

    #[test]
    fn imovel_form_with_required_fields_validates() {
        let mut form = FormState::create(FormKind::Imovel);
        form.set_value("endereco", "Av. Central, 55".to_owned());
        form.set_value("valor_aluguel", "2100.00".to_owned());
        form.set_value("area_util", "80".to_owned());
        assert!(form.validate().is_ok());
    }

    #[test]
    fn payment_without_contract_is_rejected_before_any_request() {
        let mut form = FormState::create(FormKind::Pagamento);
        form.set_value("data_pagamento", "2026-02-05".to_owned());
        form.set_value("valor_pago", "1500.00".to_owned());

        let error = form.validate().expect_err("missing contract should fail");
        assert!(error.to_string().contains("Contrato"));
    }

    #[test]
    fn malformed_dates_are_rejected() {
        let mut form = FormState::create(FormKind::Pagamento);
        form.set_value("contrato_id", "1".to_owned());
        form.set_value("valor_pago", "1500.00".to_owned());
        form.set_value("data_pagamento", "05/02/2026".to_owned());

        let error = form.validate().expect_err("bad date should fail");
        assert!(error.to_string().contains("AAAA-MM-DD"));

        form.set_value("data_pagamento", "2026-02-05".to_owned());
        assert!(form.validate().is_ok());
    }

    #[test]
    fn person_form_targets_the_discriminated_collection() {
        let mut form = FormState::create(FormKind::Pessoa);
        assert_eq!(form.submission_resource(), Resource::Locadores);
        form.person_kind = PersonKind::Fiador;
        assert_eq!(form.submission_resource(), Resource::Fiadores);
    }

    #[test]
    fn person_payload_carries_nature_but_never_the_discriminator() {
        let person = PersonRow {
            kind: PersonKind::Locatario,
            record: record(json!({
                "id": 3,
                "nome": "Ana Lima",
                "tipo_pessoa": "Física",
                "cpf_cnpj": "123.456.789-00",
                "email": "ana@example.com",
                "telefone": "11 99999-0000",
            })),
        };
        let form = FormState::edit_person(&person);
        assert_eq!(form.person_kind, PersonKind::Locatario);
        assert_eq!(form.submission_resource(), Resource::Locatarios);

        let payload = form.payload();
        assert_eq!(payload["tipo_pessoa"], json!("Física"));
        assert!(!payload.contains_key("personType"));
        assert!(!payload.contains_key("typeName"));
    }
}
