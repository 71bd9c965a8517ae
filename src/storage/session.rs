use crate::error::{Error, Result};
use crate::storage::credentials::Credentials;
use crate::storage::tree::TreeNode;
use crate::storage::{Backend, backends};
use futures::stream::TryStreamExt;
use opendal::Operator;

/// How a backend's listing is folded into a [`TreeNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStyle {
    /// One listing call per directory (prefix/delimiter pages or real directories).
    PerDirectory,
    /// One recursive listing of the whole namespace.
    Recursive,
}

/// Why the connection probe failed; replayed on every later call.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ProbeFailure {
    InvalidCredentials,
    ExpiredCredentials,
    Other(String),
}

impl ProbeFailure {
    fn from_error(err: &Error) -> Self {
        match err {
            Error::InvalidCredentials { .. } => ProbeFailure::InvalidCredentials,
            Error::ExpiredCredentials { .. } => ProbeFailure::ExpiredCredentials,
            Error::NetworkOrConfig { message, .. } => ProbeFailure::Other(message.clone()),
            other => ProbeFailure::Other(other.to_string()),
        }
    }

    fn to_error(&self, backend: Backend) -> Error {
        let name = backend.friendly_name().to_string();
        match self {
            ProbeFailure::InvalidCredentials => Error::InvalidCredentials { backend: name },
            ProbeFailure::ExpiredCredentials => Error::ExpiredCredentials { backend: name },
            ProbeFailure::Other(message) => Error::NetworkOrConfig {
                backend: name,
                message: message.clone(),
            },
        }
    }
}

enum Connection {
    Unopened(Credentials),
    Open(Operator),
    Rejected(ProbeFailure),
}

/// Connection state and cached directory tree owned by one adapter.
///
/// The operator is built and probed on first use. A rejected probe is
/// remembered: the adapter keeps returning that failure and a new adapter has
/// to be constructed to try again. The tree is built on the first read that
/// needs it and dropped by [`Session::invalidate`] after every mutation.
pub struct Session {
    backend: Backend,
    connection: Connection,
    tree: Option<TreeNode>,
}

impl Session {
    pub fn new(backend: Backend, credentials: Credentials) -> Self {
        Self {
            backend,
            connection: Connection::Unopened(credentials),
            tree: None,
        }
    }

    /// Session around an operator that is already configured; no probe is run.
    pub fn with_operator(backend: Backend, operator: Operator) -> Self {
        Self {
            backend,
            connection: Connection::Open(operator),
            tree: None,
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// The connected operator, connecting on first use.
    pub async fn operator(&mut self) -> Result<Operator> {
        let credentials = match &self.connection {
            Connection::Open(operator) => return Ok(operator.clone()),
            Connection::Rejected(failure) => return Err(failure.to_error(self.backend)),
            Connection::Unopened(credentials) => credentials,
        };

        log::debug!("connecting backend={:?}", self.backend);
        let outcome = match backends::build_operator(self.backend, credentials) {
            Ok(operator) => probe(self.backend, operator).await,
            Err(err) => Err(err),
        };

        match outcome {
            Ok(operator) => {
                self.connection = Connection::Open(operator.clone());
                Ok(operator)
            }
            Err(err) => {
                log::debug!("probe failed backend={:?}: {err}", self.backend);
                self.connection = Connection::Rejected(ProbeFailure::from_error(&err));
                Err(err)
            }
        }
    }

    /// The directory tree, listing the backend if no cached tree is held.
    pub async fn tree(&mut self, style: ListingStyle) -> Result<&TreeNode> {
        let tree = match self.tree.take() {
            Some(tree) => tree,
            None => {
                let operator = self.operator().await?;
                walk(&operator, self.backend, style).await?
            }
        };
        Ok(self.tree.insert(tree))
    }

    /// Forget the cached tree; the next read lists the backend again.
    pub fn invalidate(&mut self) {
        self.tree = None;
    }
}

async fn probe(backend: Backend, operator: Operator) -> Result<Operator> {
    match operator.check().await {
        Ok(()) => Ok(operator),
        Err(e) if e.kind() == opendal::ErrorKind::NotFound => Err(Error::NetworkOrConfig {
            backend: backend.friendly_name().to_string(),
            message: format!("storage container not found: {e}"),
        }),
        Err(e) => Err(backend.translate(e, "/")),
    }
}

async fn walk(operator: &Operator, backend: Backend, style: ListingStyle) -> Result<TreeNode> {
    let mut root = TreeNode::new("/");
    let mut listed = 0usize;

    match style {
        ListingStyle::Recursive => {
            let mut lister = operator
                .lister_with("/")
                .recursive(true)
                .await
                .map_err(|e| backend.translate(e, "/"))?;
            while let Some(entry) = lister
                .try_next()
                .await
                .map_err(|e| backend.translate(e, "/"))?
            {
                insert_entry(&mut root, &entry);
                listed += 1;
            }
        }
        ListingStyle::PerDirectory => {
            let mut pending = vec!["/".to_string()];
            while let Some(prefix) = pending.pop() {
                let mut lister = operator
                    .lister(&prefix)
                    .await
                    .map_err(|e| backend.translate(e, &prefix))?;
                while let Some(entry) = lister
                    .try_next()
                    .await
                    .map_err(|e| backend.translate(e, &prefix))?
                {
                    if entry.path() == prefix {
                        continue;
                    }
                    if entry.metadata().is_dir() {
                        pending.push(entry.path().to_string());
                    }
                    insert_entry(&mut root, &entry);
                    listed += 1;
                }
            }
        }
    }

    log::debug!("built tree backend={backend:?} style={style:?} entries={listed}");
    Ok(root)
}

fn insert_entry(root: &mut TreeNode, entry: &opendal::Entry) {
    let path = entry.path();
    if path.trim_matches('/').is_empty() {
        return;
    }
    if entry.metadata().is_dir() {
        root.insert_dir(path);
    } else {
        root.insert_file(path);
    }
}
