use bevy::prelude::*;
use bevy_replicon::prelude::*;

#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PawnEvent {
    Assigned {
        client: Entity,
        pawn: Entity
    },
    Unassigned {
        client: Entity,
        pawn: Entity
    }
}

#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientEvent {
    Spawned {
        connection: Option<ClientId>,
        client: Entity
    },
    Despawned {
        connection: Option<ClientId>,
        client: Entity
    }
}

pub(crate) fn send_event<E: Event>(world: &mut World, event: E) {
    if let Some(mut events) = world.get_resource_mut::<Events<E>>() {
        events.send(event);
    }
}
