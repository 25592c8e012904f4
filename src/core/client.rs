use bevy::{
    ecs::entity::{EntityMapper, MapEntities},
    prelude::*
};
use bevy_replicon::prelude::*;
use serde::{Serialize, Deserialize};

/// A connected participant and the pawn it currently controls.
/// Written only by the host, replicated to everyone.
#[derive(Component, Serialize, Deserialize, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Client {
    connection_id: Option<ClientId>,
    pawn: Option<Entity>
}

impl Client {
    #[inline]
    pub fn connection_id(&self) -> Option<ClientId> {
        self.connection_id
    }

    /// May point at an entity that no longer exists.
    #[inline]
    pub fn pawn(&self) -> Option<Entity> {
        self.pawn
    }

    #[inline]
    pub(crate) fn set_connection_id(&mut self, connection_id: ClientId) {
        self.connection_id = Some(connection_id);
    }

    #[inline]
    pub(crate) fn set_pawn(&mut self, pawn: Option<Entity>) {
        self.pawn = pawn;
    }
}

impl MapEntities for Client {
    fn map_entities<M: EntityMapper>(&mut self, entity_mapper: &mut M) {
        if let Some(pawn) = self.pawn.as_mut() {
            *pawn = entity_mapper.map_entity(*pawn);
        }
    }
}

#[derive(Bundle)]
pub struct ClientBundle {
    pub client: Client,
    pub replicated: Replicated
}

impl Default for ClientBundle {
    fn default() -> Self {
        Self{
            client: default(),
            replicated: Replicated
        }
    }
}
