//! Messages consumed by [`App::update`](crate::app::App::update) and the
//! background commands it emits.
//!
//! Every [`Command`] runs on its own task and answers with exactly one
//! [`Msg`] on the same channel that carries key events.

use std::path::PathBuf;
use std::sync::Arc;

use crossterm::event::KeyEvent;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::aws::{ConnectOptions, S3Service};
use crate::store::{ClientHandle, ObjectStore, StoreError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    InitClient,
    Store(Request),
}

/// Work that runs against an initialised client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    ListContainers,
    ListItems {
        container: String,
    },
    Download {
        container: String,
        key: String,
        destination: PathBuf,
    },
}

impl Command {
    pub fn list_containers() -> Self {
        Command::Store(Request::ListContainers)
    }

    pub fn list_items(container: impl Into<String>) -> Self {
        Command::Store(Request::ListItems {
            container: container.into(),
        })
    }

    pub fn download(
        container: impl Into<String>,
        key: impl Into<String>,
        destination: PathBuf,
    ) -> Self {
        Command::Store(Request::Download {
            container: container.into(),
            key: key.into(),
            destination,
        })
    }
}

#[derive(Debug)]
pub enum Msg {
    Key(KeyEvent),
    Resize(u16),
    ClientReady(ClientHandle),
    Containers(Vec<String>),
    Items {
        container: String,
        items: Vec<String>,
    },
    Downloaded {
        container: String,
        key: String,
        path: PathBuf,
    },
    Failed(StoreError),
}

pub async fn execute(request: Request, store: &dyn ObjectStore) -> Msg {
    match request {
        Request::ListContainers => match store.list_containers().await {
            Ok(containers) => Msg::Containers(containers),
            Err(err) => Msg::Failed(err),
        },
        Request::ListItems { container } => match store.list_items(&container).await {
            Ok(items) => Msg::Items { container, items },
            Err(err) => Msg::Failed(err),
        },
        Request::Download {
            container,
            key,
            destination,
        } => match store.download(&container, &key, &destination).await {
            Ok(path) => Msg::Downloaded {
                container,
                key,
                path,
            },
            Err(err) => Msg::Failed(err),
        },
    }
}

/// Spawns commands onto the runtime and routes their results back.
pub struct Dispatcher {
    tx: UnboundedSender<Msg>,
    options: ConnectOptions,
}

impl Dispatcher {
    pub fn new(tx: UnboundedSender<Msg>, options: ConnectOptions) -> Self {
        Self { tx, options }
    }

    pub fn dispatch(&self, command: Command, client: Option<ClientHandle>) {
        debug!(?command, "dispatching");
        let tx = self.tx.clone();
        let options = self.options.clone();
        tokio::spawn(async move {
            let msg = match (command, client) {
                (Command::InitClient, _) => match S3Service::connect(&options).await {
                    Ok(service) => Msg::ClientReady(Arc::new(service)),
                    Err(err) => Msg::Failed(err),
                },
                (Command::Store(request), Some(client)) => {
                    execute(request, client.as_ref()).await
                }
                (Command::Store(_), None) => Msg::Failed(StoreError::NotConnected),
            };
            if let Msg::Failed(err) = &msg {
                warn!(%err, "command failed");
            }
            // The receiver is gone once the UI has shut down.
            let _ = tx.send(msg);
        });
    }
}
