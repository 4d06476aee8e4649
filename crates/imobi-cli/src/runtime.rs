// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use imobi_api::Client;
use imobi_app::{FormKind, FormState, PersonKind, PersonRow, RecordId, Resource, TabKind};
use imobi_tui::{InternalEvent, PageRuntime, PageSnapshot, ReferenceData};
use std::sync::mpsc::Sender;
use std::thread;

/// `PageRuntime` over the REST client. Mutations never touch local state;
/// the view re-fetches the collection after every one of them.
pub struct ApiRuntime {
    client: Client,
}

impl ApiRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl PageRuntime for ApiRuntime {
    fn load_page(&mut self, tab: TabKind) -> Result<PageSnapshot> {
        load_page_with(&self.client, tab)
    }

    fn load_references(&mut self, kind: FormKind) -> ReferenceData {
        load_references_with(&self.client, kind)
    }

    fn submit_form(&mut self, form: &FormState) -> Result<()> {
        form.validate()?;
        let payload = form.payload();
        let resource = form.submission_resource();
        match form.editing {
            Some(id) => self.client.update(resource, id, &payload)?,
            None => self.client.create(resource, &payload)?,
        }
        Ok(())
    }

    fn delete_record(&mut self, resource: Resource, id: RecordId) -> Result<()> {
        self.client.delete(resource, id)?;
        Ok(())
    }

    fn spawn_page_load(
        &mut self,
        generation: u64,
        tab: TabKind,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        thread::spawn(move || {
            let result = load_page_with(&client, tab).map_err(|error| format!("{error:#}"));
            let _ = tx.send(InternalEvent::PageLoaded {
                generation,
                tab,
                result,
            });
        });
        Ok(())
    }

    fn spawn_reference_load(
        &mut self,
        generation: u64,
        kind: FormKind,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        thread::spawn(move || {
            let data = load_references_with(&client, kind);
            let _ = tx.send(InternalEvent::ReferencesLoaded {
                generation,
                kind,
                data,
            });
        });
        Ok(())
    }
}

fn load_page_with(client: &Client, tab: TabKind) -> Result<PageSnapshot> {
    let snapshot = match tab {
        TabKind::Imoveis => PageSnapshot::Imoveis(client.list(Resource::Imoveis)?),
        TabKind::Pessoas => load_people(client)?,
        TabKind::Contratos => PageSnapshot::Contratos(client.list(Resource::Contratos)?),
        TabKind::Pagamentos => PageSnapshot::Pagamentos(client.list(Resource::Pagamentos)?),
        TabKind::Manutencao => PageSnapshot::Manutencao(client.list(Resource::Manutencoes)?),
    };
    Ok(snapshot)
}

/// The pessoas page merges four collections, fetched concurrently and
/// joined: one failed source fails the whole page, like any other list
/// fetch.
fn load_people(client: &Client) -> Result<PageSnapshot> {
    let results = thread::scope(|scope| {
        let handles: Vec<_> = PersonKind::ALL
            .into_iter()
            .map(|kind| (kind, scope.spawn(move || client.list(kind.resource()))))
            .collect();
        handles
            .into_iter()
            .map(|(kind, handle)| {
                let result = handle
                    .join()
                    .unwrap_or_else(|_| Err(panicked_fetch(kind.resource())));
                (kind, result)
            })
            .collect::<Vec<_>>()
    });

    let mut rows = Vec::new();
    for (kind, result) in results {
        let records =
            result.with_context(|| format!("buscar a lista de {}", kind.resource().path()))?;
        rows.extend(
            records
                .into_iter()
                .map(|record| PersonRow { kind, record }),
        );
    }
    Ok(PageSnapshot::Pessoas(rows))
}

/// Reference collections are fetched concurrently too, but failures degrade
/// per source: the form stays editable and shows which list is missing.
fn load_references_with(client: &Client, kind: FormKind) -> ReferenceData {
    let sources = kind.reference_sources();
    let collections = thread::scope(|scope| {
        let handles: Vec<_> = sources
            .into_iter()
            .map(|source| (source, scope.spawn(move || client.list(source.resource()))))
            .collect();
        handles
            .into_iter()
            .map(|(source, handle)| {
                let result = handle
                    .join()
                    .unwrap_or_else(|_| Err(panicked_fetch(source.resource())))
                    .map_err(|error| error.to_string());
                (source, result)
            })
            .collect()
    });
    ReferenceData { collections }
}

fn panicked_fetch(resource: Resource) -> imobi_api::ApiError {
    imobi_api::ApiError::Decode {
        url: format!("/api/{}/", resource.path()),
        detail: "busca interrompida".to_owned(),
    }
}
