// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabKind {
    Imoveis,
    Pessoas,
    Contratos,
    Pagamentos,
    Manutencao,
}

impl TabKind {
    pub const ALL: [Self; 5] = [
        Self::Imoveis,
        Self::Pessoas,
        Self::Contratos,
        Self::Pagamentos,
        Self::Manutencao,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Imoveis => "imoveis",
            Self::Pessoas => "pessoas",
            Self::Contratos => "contratos",
            Self::Pagamentos => "pagamentos",
            Self::Manutencao => "manutencao",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Imoveis => "Gestão de Imóveis",
            Self::Pessoas => "Gestão de Pessoas",
            Self::Contratos => "Gestão de Contratos",
            Self::Pagamentos => "Gestão de Pagamentos",
            Self::Manutencao => "Gestão de Manutenções",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "imoveis" => Some(Self::Imoveis),
            "pessoas" => Some(Self::Pessoas),
            "contratos" => Some(Self::Contratos),
            "pagamentos" => Some(Self::Pagamentos),
            "manutencao" => Some(Self::Manutencao),
            _ => None,
        }
    }
}

/// One backend collection under `/api/<path>/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Resource {
    Imoveis,
    Locadores,
    Locatarios,
    Fiadores,
    Intermediarios,
    Contratos,
    Pagamentos,
    Manutencoes,
}

impl Resource {
    pub const fn path(self) -> &'static str {
        match self {
            Self::Imoveis => "imoveis",
            Self::Locadores => "locadores",
            Self::Locatarios => "locatarios",
            Self::Fiadores => "fiadores",
            Self::Intermediarios => "intermediarios",
            Self::Contratos => "contratos",
            Self::Pagamentos => "pagamentos",
            Self::Manutencoes => "manutencoes",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "imoveis" => Some(Self::Imoveis),
            "locadores" => Some(Self::Locadores),
            "locatarios" => Some(Self::Locatarios),
            "fiadores" => Some(Self::Fiadores),
            "intermediarios" => Some(Self::Intermediarios),
            "contratos" => Some(Self::Contratos),
            "pagamentos" => Some(Self::Pagamentos),
            "manutencoes" => Some(Self::Manutencoes),
            _ => None,
        }
    }
}

/// Which of the four people collections a merged pessoa row came from.
///
/// The discriminator is carried next to the record, never inside its
/// attribute map, so it can never leak into an outgoing payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersonKind {
    Locador,
    Locatario,
    Fiador,
    Intermediario,
}

impl PersonKind {
    pub const ALL: [Self; 4] = [
        Self::Locador,
        Self::Locatario,
        Self::Fiador,
        Self::Intermediario,
    ];

    pub const fn resource(self) -> Resource {
        match self {
            Self::Locador => Resource::Locadores,
            Self::Locatario => Resource::Locatarios,
            Self::Fiador => Resource::Fiadores,
            Self::Intermediario => Resource::Intermediarios,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Locador => "Locador",
            Self::Locatario => "Locatário",
            Self::Fiador => "Fiador",
            Self::Intermediario => "Intermediário",
        }
    }
}

/// One entity of a resource: a server-assigned id plus an opaque attribute
/// map. The client asserts no schema beyond the field configuration tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: Option<RecordId>,
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(fields) = value else {
            bail!("expected a JSON object for an entity, got {value}");
        };
        let id = match fields.get("id") {
            None | Some(Value::Null) => None,
            Some(Value::Number(number)) => number.as_i64().map(RecordId::new),
            Some(other) => bail!("entity id must be numeric, got {other}"),
        };
        Ok(Self { id, fields })
    }

    pub fn from_values(values: Vec<Value>) -> Result<Vec<Self>> {
        values.into_iter().map(Self::from_value).collect()
    }

    /// Attribute coerced to display text. Null and missing become empty.
    pub fn text(&self, key: &str) -> String {
        match self.fields.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(value)) => value.clone(),
            Some(Value::Number(value)) => value.to_string(),
            Some(Value::Bool(value)) => value.to_string(),
            Some(other) => other.to_string(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// A row of the merged pessoas page.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonRow {
    pub kind: PersonKind,
    pub record: Record,
}

pub const COMMERCIAL_PROPERTY_TYPES: &[&str] = &["Sala Comercial"];

/// The one place business logic leaks into presentation: commercial
/// certificate fields exist only for these property types.
pub fn is_commercial_property_type(tipo_imovel: &str) -> bool {
    COMMERCIAL_PROPERTY_TYPES.contains(&tipo_imovel)
}

#[cfg(test)]
mod tests {
    use super::{PersonKind, Record, Resource, TabKind, is_commercial_property_type};
    use crate::ids::RecordId;
    use serde_json::json;

    #[test]
    fn record_parses_id_and_keeps_attributes() {
        let record = Record::from_value(json!({
            "id": 7,
            "endereco": "Rua A, 10",
            "valor_venda": null,
        }))
        .expect("object should parse");

        assert_eq!(record.id, Some(RecordId::new(7)));
        assert_eq!(record.text("endereco"), "Rua A, 10");
        assert_eq!(record.text("valor_venda"), "");
        assert_eq!(record.text("missing"), "");
    }

    #[test]
    fn record_without_id_is_accepted() {
        let record = Record::from_value(json!({"nome": "Ana"})).expect("object should parse");
        assert_eq!(record.id, None);
    }

    #[test]
    fn record_rejects_non_objects() {
        assert!(Record::from_value(json!([1, 2])).is_err());
        assert!(Record::from_value(json!("texto")).is_err());
    }

    #[test]
    fn record_rejects_non_numeric_id() {
        assert!(Record::from_value(json!({"id": "sete"})).is_err());
    }

    #[test]
    fn person_kinds_map_to_their_collections() {
        assert_eq!(PersonKind::Locador.resource(), Resource::Locadores);
        assert_eq!(PersonKind::Locatario.resource(), Resource::Locatarios);
        assert_eq!(PersonKind::Fiador.resource(), Resource::Fiadores);
        assert_eq!(PersonKind::Intermediario.resource(), Resource::Intermediarios);
    }

    #[test]
    fn resource_paths_round_trip() {
        for resource in [
            Resource::Imoveis,
            Resource::Locadores,
            Resource::Locatarios,
            Resource::Fiadores,
            Resource::Intermediarios,
            Resource::Contratos,
            Resource::Pagamentos,
            Resource::Manutencoes,
        ] {
            assert_eq!(Resource::parse(resource.path()), Some(resource));
        }
    }

    #[test]
    fn tab_labels_round_trip() {
        for tab in TabKind::ALL {
            assert_eq!(TabKind::parse(tab.label()), Some(tab));
        }
    }

    #[test]
    fn only_designated_types_are_commercial() {
        assert!(is_commercial_property_type("Sala Comercial"));
        assert!(!is_commercial_property_type("Apartamento"));
        assert!(!is_commercial_property_type("Casa"));
        assert!(!is_commercial_property_type(""));
    }
}
