use bevy::prelude::*;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum PawnServerSet {
    TrackConnections,
    ManageClients
}

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum PawnClientSet {
    MarkOwning
}
