use bevy::prelude::*;
use bevy_replicon::prelude::*;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PawnError {
    #[error("failed to call {0} due to being invoked on non-host participant")]
    NotAuthority(&'static str),
    #[error("connection {} is not connected", .0.get())]
    UnknownConnection(ClientId),
    #[error("connection {} is already bound to client {:?}", .0.get(), .1)]
    ConnectionTaken(ClientId, Entity),
    #[error("entity {0:?} has no client component")]
    NotAClient(Entity),
    #[error("{0} had no pawn template registered")]
    NoTemplate(&'static str),
    #[error("assigned entity ({0}) with no pawn capability")]
    MissingCapability(String),
    #[error("pawn {0:?} was despawned during assignment")]
    Despawned(Entity),
    #[error("assigned pawn is {found}, expected {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str
    }
}
