// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Test fixtures for the workspace: canned backend records and a scriptable
//! mock of the property-management REST API.

use std::collections::HashMap;
use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use anyhow::{Result, anyhow};
use serde_json::{Value, json};
use tiny_http::{Header, Response, Server};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StubResponse {
    status: u16,
    body: String,
}

type RouteKey = (String, String);

/// An HTTP server on an ephemeral port that answers from a stubbed route
/// table and records every request it sees, so tests can assert on exact
/// request counts and targets.
pub struct MockApi {
    server: Arc<Server>,
    base_url: String,
    routes: Arc<Mutex<HashMap<RouteKey, StubResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: Option<JoinHandle<()>>,
}

impl MockApi {
    pub fn start() -> Result<Self> {
        let server = Arc::new(
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock API: {error}"))?,
        );
        let base_url = format!("http://{}", server.server_addr());
        let routes: Arc<Mutex<HashMap<RouteKey, StubResponse>>> =
            Arc::new(Mutex::new(HashMap::new()));
        let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::new(Mutex::new(Vec::new()));

        let serve_server = Arc::clone(&server);
        let serve_routes = Arc::clone(&routes);
        let serve_requests = Arc::clone(&requests);
        let handle = std::thread::spawn(move || {
            for mut request in serve_server.incoming_requests() {
                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);

                let method = request.method().to_string().to_ascii_uppercase();
                let url = request.url().to_owned();
                if let Ok(mut log) = serve_requests.lock() {
                    log.push(RecordedRequest {
                        method: method.clone(),
                        url: url.clone(),
                        body,
                    });
                }

                let stub = serve_routes
                    .lock()
                    .ok()
                    .and_then(|table| table.get(&(method, url)).cloned())
                    .unwrap_or(StubResponse {
                        status: 404,
                        body: r#"{"detail":"not found"}"#.to_owned(),
                    });

                let response = Response::from_string(stub.body)
                    .with_status_code(stub.status)
                    .with_header(
                        Header::from_bytes("Content-Type", "application/json")
                            .expect("valid content type header"),
                    );
                let _ = request.respond(response);
            }
        });

        Ok(Self {
            server,
            base_url,
            routes,
            requests,
            handle: Some(handle),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn stub(&self, method: &str, path: &str, status: u16, body: &str) {
        if let Ok(mut table) = self.routes.lock() {
            table.insert(
                (method.to_ascii_uppercase(), path.to_owned()),
                StubResponse {
                    status,
                    body: body.to_owned(),
                },
            );
        }
    }

    /// Stub `GET /api/<resource>/` with a JSON array body.
    pub fn stub_collection(&self, resource: &str, records: &[Value]) {
        self.stub(
            "GET",
            &format!("/api/{resource}/"),
            200,
            &Value::Array(records.to_vec()).to_string(),
        );
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn requests_matching(&self, method: &str) -> Vec<RecordedRequest> {
        let method = method.to_ascii_uppercase();
        self.requests()
            .into_iter()
            .filter(|request| request.method == method)
            .collect()
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub fn sample_imovel() -> Value {
    json!({
        "id": 1,
        "endereco": "Rua A, 10",
        "tipo_imovel": "Apartamento",
        "status_imovel": "Disponível",
        "valor_aluguel": "1500.00",
        "area_util": 65,
    })
}

pub fn sample_imovel_comercial() -> Value {
    json!({
        "id": 2,
        "endereco": "Av. Paulista, 900 cj 41",
        "tipo_imovel": "Sala Comercial",
        "status_imovel": "Alugado",
        "valor_aluguel": "4200.00",
        "numero_avcb": "AVCB-2024-0113",
        "vencimento_avcb": "2027-03-01",
    })
}

pub fn sample_pessoa(id: i64, nome: &str) -> Value {
    json!({
        "id": id,
        "nome": nome,
        "tipo_pessoa": "Física",
        "cpf_cnpj": "123.456.789-00",
        "email": "contato@example.com",
        "telefone": "11 99999-0000",
        "endereco": "Rua B, 20",
    })
}

pub fn sample_contrato() -> Value {
    json!({
        "id": 4,
        "imovel": "Rua A, 10",
        "locatario": "Ana Lima",
        "status_contrato": "Ativo",
        "data_inicio": "2025-01-01",
        "data_fim": "2026-01-01",
        "valor_aluguel": "1500.00",
    })
}

pub fn sample_pagamento() -> Value {
    json!({
        "id": 11,
        "contrato": "Contrato #4",
        "contrato_id": 4,
        "data_pagamento": "2026-02-05",
        "valor_pago": "1500.00",
        "status_pagamento": "Pago",
        "forma_pagamento": "PIX",
    })
}

pub fn sample_manutencao() -> Value {
    json!({
        "id": 21,
        "imovel": "Rua A, 10",
        "imovel_id": 1,
        "data_solicitacao": "2026-01-15",
        "descricao": "Vazamento na cozinha",
        "status_manutencao": "Pendente",
        "custo_manutencao": null,
    })
}

#[cfg(test)]
mod tests {
    use super::{sample_imovel, sample_imovel_comercial, sample_pessoa};
    use imobi_app::Record;

    #[test]
    fn sample_records_parse_as_entities() {
        let imovel = Record::from_value(sample_imovel()).expect("sample should parse");
        assert_eq!(imovel.text("valor_aluguel"), "1500.00");

        let comercial =
            Record::from_value(sample_imovel_comercial()).expect("sample should parse");
        assert_eq!(comercial.text("tipo_imovel"), "Sala Comercial");

        let pessoa = Record::from_value(sample_pessoa(3, "Ana Lima")).expect("sample should parse");
        assert_eq!(pessoa.text("nome"), "Ana Lima");
    }
}
