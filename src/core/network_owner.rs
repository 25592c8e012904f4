use bevy::prelude::*;
use bevy_replicon::prelude::*;
use serde::{Serialize, Deserialize};
use super::session::Session;

/// Connection owning a replicated entity.
#[derive(Component, Serialize, Deserialize, Eq, PartialEq, Hash, Clone, Copy, Debug)]
pub struct NetworkOwner(ClientId);

impl NetworkOwner {
    #[inline]
    pub fn new(client_id: ClientId) -> Self {
        Self(client_id)
    }

    #[inline]
    pub fn client_id(&self) -> ClientId {
        self.0
    }
}

/// Marks entities owned by the local participant.
#[derive(Component)]
pub struct Owning;

pub(crate) enum Ownership {
    Registered,
    Transferred {
        from: Option<ClientId>
    }
}

/// Registers the entity for replication under `owner`,
/// or moves ownership when it is already replicated.
pub(crate) fn establish_ownership(
    world: &mut World, 
    entity: Entity, 
    owner: ClientId
) -> Ownership {
    let mut entity_mut = world.entity_mut(entity);
    if entity_mut.contains::<Replicated>() {
        let from = entity_mut.get::<NetworkOwner>()
        .map(|o| o.client_id());
        entity_mut.insert(NetworkOwner::new(owner));
        Ownership::Transferred { from }
    } else {
        entity_mut.insert((
            Replicated,
            NetworkOwner::new(owner)
        ));
        Ownership::Registered
    }
}

pub(crate) fn mark_owning_system(
    mut commands: Commands,
    query: Query<(Entity, &NetworkOwner, Has<Owning>), Changed<NetworkOwner>>,
    session: Res<Session>
) {
    for (e, owner, owning) in query.iter() {
        let is_local = session.is_local(&owner.client_id());
        if is_local && !owning {
            commands.entity(e)
            .insert(Owning);
        } else if !is_local && owning {
            commands.entity(e)
            .remove::<Owning>();
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy::ecs::system::RunSystemOnce;
    use super::*;

    #[test]
    fn unreplicated_entity_is_registered() {
        let mut world = World::new();
        let e = world.spawn_empty().id();
        let owner = ClientId::new(4);
        assert!(matches!(
            establish_ownership(&mut world, e, owner), 
            Ownership::Registered
        ));
        assert!(world.entity(e).contains::<Replicated>());
        assert_eq!(world.get::<NetworkOwner>(e), Some(&NetworkOwner::new(owner)));
    }

    #[test]
    fn replicated_entity_is_transferred() {
        let mut world = World::new();
        let e = world.spawn((Replicated, NetworkOwner::new(ClientId::SERVER))).id();
        let owner = ClientId::new(9);
        match establish_ownership(&mut world, e, owner) {
            Ownership::Transferred { from } => assert_eq!(from, Some(ClientId::SERVER)),
            Ownership::Registered => panic!("replicated entity was registered again")
        }
        assert_eq!(world.get::<NetworkOwner>(e), Some(&NetworkOwner::new(owner)));
    }

    #[test]
    fn owning_follows_network_owner() {
        let mut world = World::new();
        let local = ClientId::new(2);
        world.insert_resource(Session::observer(local));
        let mine = world.spawn(NetworkOwner::new(local)).id();
        let theirs = world.spawn(NetworkOwner::new(ClientId::new(3))).id();

        world.run_system_once(mark_owning_system);
        assert!(world.entity(mine).contains::<Owning>());
        assert!(!world.entity(theirs).contains::<Owning>());

        world.entity_mut(mine).insert(NetworkOwner::new(ClientId::new(3)));
        world.entity_mut(theirs).insert(NetworkOwner::new(local));
        world.run_system_once(mark_owning_system);
        assert!(!world.entity(mine).contains::<Owning>());
        assert!(world.entity(theirs).contains::<Owning>());
    }
}
